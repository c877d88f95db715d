//! The process façade.

use std::future::Future;
use std::sync::Arc;

use conflux_signal::ExecutionId;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ProcessConfig;
use crate::error::JobError;
use crate::handle::ExecutionHandle;
use crate::hook::{FailureHook, NoopHook};
use crate::runner::{self, ExecutionRequest, RunnerChannels};
use crate::strategy::Strategy;

/// Executes jobs under a fixed concurrency [`Strategy`] and exposes shared
/// `busy`/`error`/`result` signals derived from the overlapping executions.
///
/// A process must be created inside a tokio runtime; it spawns one runner
/// task that owns all aggregate state. Dropping the process closes the
/// request channel and lets in-flight executions drain;
/// [`shutdown`](Process::shutdown) stops the runner immediately instead.
pub struct Process<T> {
  channels: RunnerChannels<T>,
  cancel: CancellationToken,
  strategy: Strategy,
}

impl<T: Clone + Send + Sync + 'static> Process<T> {
  /// Create a process with the given configuration.
  pub fn new(config: ProcessConfig) -> Self {
    Self::with_hook(config, Arc::new(NoopHook))
  }

  /// Create a process with the given strategy and defaults otherwise.
  pub fn with_strategy(strategy: Strategy) -> Self {
    Self::new(ProcessConfig::new(strategy))
  }

  /// Create a process that additionally forwards job failures to `hook`.
  ///
  /// The hook never alters signal behavior; it observes failures after they
  /// have been applied to the error signal.
  pub fn with_hook(config: ProcessConfig, hook: Arc<dyn FailureHook>) -> Self {
    let cancel = CancellationToken::new();
    let channels = runner::spawn(config, hook, cancel.clone());
    Self { channels, cancel, strategy: config.strategy }
  }

  /// Start one execution of `job` under the configured strategy.
  ///
  /// Exactly one progress registration is made per call, with exactly one
  /// matching unregistration on completion, failure, or supersession.
  ///
  /// The returned handle resolves with the job's own outcome even when a
  /// `latest` process supersedes the execution in the aggregate signals;
  /// supersession only fires the handle's cancellation token, and a job that
  /// wants to stop early has to observe that token itself.
  pub fn execute<F, Fut>(&self, job: F) -> ExecutionHandle<T>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
  {
    let id = ExecutionId::new();
    let (outcome_tx, outcome_rx) = watch::channel(None);
    let cancel = CancellationToken::new();
    let handle = ExecutionHandle::new(id, outcome_rx, cancel.clone());

    let request = ExecutionRequest {
      id,
      job: Box::pin(async move { job().await }),
      outcome: outcome_tx,
      cancel,
    };
    if let Err(rejected) = self.channels.requests.send(request) {
      // Runner already exited (shutdown or fail-fast stop); honor the handle
      // contract without running the job.
      debug!(execution_id = %id, "execution rejected, runner exited");
      rejected.0.outcome.send_replace(Some(Err(JobError::Abandoned)));
    }
    handle
  }

  /// The strategy this process was created with.
  pub fn strategy(&self) -> Strategy {
    self.strategy
  }

  /// Busy signal: true while the aggregate view has an outstanding
  /// execution. Late subscribers observe the current value immediately.
  pub fn busy(&self) -> watch::Receiver<bool> {
    self.channels.busy.clone()
  }

  /// Current busy state.
  pub fn is_busy(&self) -> bool {
    *self.channels.busy.borrow()
  }

  /// Error signal: the most recent failure, cleared at each new start.
  pub fn error(&self) -> watch::Receiver<Option<JobError>> {
    self.channels.errors.clone()
  }

  /// Current error state.
  pub fn last_error(&self) -> Option<JobError> {
    self.channels.errors.borrow().clone()
  }

  /// Result signal: the most recent successful value, replayed to every
  /// subscriber. The channel closes when a fail-fast failure terminates the
  /// aggregate stream.
  pub fn result(&self) -> watch::Receiver<Option<T>> {
    self.channels.result.clone()
  }

  /// Most recent successful value.
  pub fn latest(&self) -> Option<T> {
    self.channels.result.borrow().clone()
  }

  /// Stop the runner. In-flight jobs keep running and their handles still
  /// resolve, but aggregate signals stop updating and further `execute`
  /// calls are abandoned.
  pub fn shutdown(&self) {
    self.cancel.cancel();
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  use tokio::time::sleep;

  use super::*;

  #[tokio::test]
  async fn execute_resolves_with_job_value() {
    let process: Process<u32> = Process::new(ProcessConfig::default());
    let value = process
      .execute(|| async { Ok(41 + 1) })
      .wait()
      .await
      .unwrap();
    assert_eq!(value, 42);
  }

  #[tokio::test]
  async fn handle_clones_share_one_invocation() {
    let calls = Arc::new(AtomicUsize::new(0));
    let process: Process<u32> = Process::with_strategy(Strategy::Parallel);

    let counted = calls.clone();
    let handle = process.execute(move || {
      counted.fetch_add(1, Ordering::SeqCst);
      async move {
        sleep(Duration::from_millis(20)).await;
        Ok(5)
      }
    });

    let twin = handle.clone();
    let (a, b) = tokio::join!(handle.wait(), twin.wait());
    assert_eq!(a.unwrap(), 5);
    assert_eq!(b.unwrap(), 5);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn shutdown_abandons_new_executions() {
    let process: Process<u32> = Process::with_strategy(Strategy::Queue);
    process.shutdown();
    // Give the runner a turn to observe the cancellation.
    sleep(Duration::from_millis(10)).await;

    let handle = process.execute(|| async { Ok(1) });
    assert!(matches!(handle.wait().await, Err(JobError::Abandoned)));
  }

  #[tokio::test]
  async fn failure_hook_sees_each_failure() {
    struct Recording(Mutex<Vec<String>>);
    impl FailureHook for Recording {
      fn report(&self, error: &JobError) {
        self.0.lock().unwrap().push(error.to_string());
      }
    }

    let hook = Arc::new(Recording(Mutex::new(Vec::new())));
    let process: Process<u32> =
      Process::with_hook(ProcessConfig::default(), hook.clone());

    let outcome = process
      .execute(|| async { Err(JobError::msg("denied")) })
      .wait()
      .await;
    assert!(outcome.is_err());

    // The hook fires from the runner task shortly after the handle resolves.
    let mut error = process.error();
    error.wait_for(|err| err.is_some()).await.unwrap();
    let reports = hook.0.lock().unwrap();
    assert_eq!(reports.as_slice(), ["job failed: denied"]);
  }
}
