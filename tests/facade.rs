//! End-to-end smoke test over the façade re-exports.

use std::time::Duration;

use conflux::{JobError, Process, ProcessConfig, Resource, Strategy};
use tokio::time::sleep;

#[tokio::test]
async fn process_and_resource_work_through_the_facade() {
  let process: Process<u32> = Process::new(ProcessConfig::new(Strategy::Queue));
  let first = process.execute(|| async {
    sleep(Duration::from_millis(10)).await;
    Ok(1)
  });
  let second = process.execute(|| async { Ok(2) });
  assert_eq!(first.wait().await.unwrap(), 1);
  assert_eq!(second.wait().await.unwrap(), 2);

  let resource: Resource<&'static str, String> =
    Resource::new(ProcessConfig::default(), |name: &'static str| async move {
      if name.is_empty() {
        Err(JobError::msg("empty name"))
      } else {
        Ok(format!("hello {name}"))
      }
    });
  resource.load("world").wait().await.unwrap();

  let mut data = resource.data();
  data.wait_for(|value| value.is_some()).await.unwrap();
  assert_eq!(data.borrow().as_deref(), Some("hello world"));
}
