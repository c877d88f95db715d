//! Continuously-reloadable read models.

use std::future::Future;
use std::sync::{Arc, Mutex};

use conflux_process::{ExecutionHandle, JobError, Process, ProcessConfig};
use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::debug;

type Loader<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, JobError>> + Send + Sync>;

/// A read model backed by one process and a load function.
///
/// Instead of handing jobs to `execute`, callers inject load arguments;
/// every `load` runs the load function under the configured strategy. The
/// latest successfully loaded value is replayed to every `data` subscriber,
/// and subscribing never triggers a load.
pub struct Resource<A, T> {
  process: Process<T>,
  loader: Loader<A, T>,
  last_arg: Mutex<Option<A>>,
}

impl<A, T> Resource<A, T>
where
  A: Clone + Send + 'static,
  T: Clone + Send + Sync + 'static,
{
  /// Create a resource with the given configuration and load function.
  pub fn new<F, Fut>(config: ProcessConfig, loader: F) -> Self
  where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
  {
    Self {
      process: Process::new(config),
      loader: Arc::new(move |arg| Box::pin(loader(arg))),
      last_arg: Mutex::new(None),
    }
  }

  /// Inject one load argument; remembered for [`reload`](Resource::reload).
  pub fn load(&self, arg: A) -> ExecutionHandle<T> {
    *self.last_arg.lock().unwrap() = Some(arg.clone());
    self.request(arg)
  }

  /// Re-issue the last load argument, if any.
  pub fn reload(&self) -> Option<ExecutionHandle<T>> {
    let arg = self.last_arg.lock().unwrap().clone()?;
    debug!("reloading with last argument");
    Some(self.request(arg))
  }

  fn request(&self, arg: A) -> ExecutionHandle<T> {
    let loader = self.loader.clone();
    self.process.execute(move || loader(arg))
  }

  /// Latest successfully loaded value, replayed to every subscriber.
  pub fn data(&self) -> watch::Receiver<Option<T>> {
    self.process.result()
  }

  /// Current value of the data signal.
  pub fn latest(&self) -> Option<T> {
    self.process.latest()
  }

  /// Busy signal forwarded from the underlying process.
  pub fn busy(&self) -> watch::Receiver<bool> {
    self.process.busy()
  }

  /// Current busy state.
  pub fn is_busy(&self) -> bool {
    self.process.is_busy()
  }

  /// Error signal forwarded from the underlying process.
  pub fn error(&self) -> watch::Receiver<Option<JobError>> {
    self.process.error()
  }

  /// Current error state.
  pub fn last_error(&self) -> Option<JobError> {
    self.process.last_error()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  use conflux_process::Strategy;
  use tokio::time::sleep;

  use super::*;

  #[tokio::test]
  async fn load_populates_data() {
    let resource: Resource<u32, u32> =
      Resource::new(ProcessConfig::default(), |arg: u32| async move { Ok(arg * 2) });
    assert!(resource.latest().is_none());

    resource.load(21).wait().await.unwrap();

    let mut data = resource.data();
    data.wait_for(|value| value.is_some()).await.unwrap();
    assert_eq!(*data.borrow(), Some(42));
  }

  #[tokio::test]
  async fn subscribing_never_triggers_a_load() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counted = loads.clone();
    let resource: Resource<u32, u32> =
      Resource::new(ProcessConfig::default(), move |arg: u32| {
        let counted = counted.clone();
        async move {
          counted.fetch_add(1, Ordering::SeqCst);
          Ok(arg)
        }
      });

    resource.load(1).wait().await.unwrap();
    let _one = resource.data();
    let _two = resource.data();
    sleep(Duration::from_millis(20)).await;
    assert_eq!(loads.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn reload_reissues_the_last_argument() {
    let resource: Resource<u32, u32> = Resource::new(
      ProcessConfig::new(Strategy::Latest),
      |arg: u32| async move { Ok(arg + 1) },
    );
    assert!(resource.reload().is_none());

    resource.load(10).wait().await.unwrap();
    let reloaded = resource.reload().expect("argument remembered");
    assert_eq!(reloaded.wait().await.unwrap(), 11);
  }
}
