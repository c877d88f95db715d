//! CRUD composition behavior over the public API.

use std::time::Duration;

use conflux_process::{JobError, ProcessConfig};
use conflux_resource::CrudResource;
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
  Duration::from_millis(n)
}

fn crud() -> CrudResource<u32, u32, u32> {
  CrudResource::new(ProcessConfig::default(), |arg: u32| async move { Ok(arg) })
}

#[tokio::test]
async fn is_processing_tracks_any_busy_part() {
  let crud = crud();
  let mut processing = crud.is_processing();
  assert!(!*processing.borrow());

  let mutation = crud.update(|| async {
    sleep(ms(60)).await;
    Ok(3)
  });

  processing.wait_for(|busy| *busy).await.unwrap();
  mutation.wait().await.unwrap();
  processing.wait_for(|busy| !busy).await.unwrap();
}

#[tokio::test]
async fn processing_error_reports_any_failing_part() {
  let crud = crud();
  let mut error = crud.processing_error();
  assert!(error.borrow().is_none());

  let failing = crud.delete(|| async { Err(JobError::msg("denied")) });
  assert!(failing.wait().await.is_err());

  error.wait_for(|err| err.is_some()).await.unwrap();
  assert_eq!(
    error.borrow().as_ref().unwrap().to_string(),
    "job failed: denied"
  );
}

#[tokio::test]
async fn mutations_and_loads_share_one_processing_signal() {
  let crud = crud();
  let mut processing = crud.is_processing();

  crud.load(7).wait().await.unwrap();
  let mut data = crud.data();
  data.wait_for(|value| *value == Some(7)).await.unwrap();

  let create = crud.create(|| async {
    sleep(ms(40)).await;
    Ok(1)
  });
  let delete = crud.delete(|| async {
    sleep(ms(60)).await;
    Ok(2)
  });

  processing.wait_for(|busy| *busy).await.unwrap();
  create.wait().await.unwrap();
  delete.wait().await.unwrap();
  processing.wait_for(|busy| !busy).await.unwrap();
}
