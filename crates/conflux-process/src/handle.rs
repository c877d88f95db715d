//! Per-call execution handles.

use conflux_signal::ExecutionId;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error::JobError;

pub(crate) type Outcome<T> = Option<Result<T, JobError>>;

/// Single-outcome container for one execution.
///
/// Resolves with exactly the value or error the job itself produced,
/// independent of how the aggregate signals treat the execution. Cloning the
/// handle never re-invokes the job; every clone observes the same outcome.
#[derive(Debug, Clone)]
pub struct ExecutionHandle<T> {
  id: ExecutionId,
  outcome: watch::Receiver<Outcome<T>>,
  cancel: CancellationToken,
}

impl<T: Clone> ExecutionHandle<T> {
  pub(crate) fn new(
    id: ExecutionId,
    outcome: watch::Receiver<Outcome<T>>,
    cancel: CancellationToken,
  ) -> Self {
    Self { id, outcome, cancel }
  }

  /// The execution this handle belongs to.
  pub fn id(&self) -> ExecutionId {
    self.id
  }

  /// Cancellation token attached to this execution.
  ///
  /// Fired when a `latest` process supersedes the execution. Cancellation is
  /// cooperative: the job keeps running unless it observes the token itself.
  pub fn cancellation(&self) -> CancellationToken {
    self.cancel.clone()
  }

  /// Whether the execution has been superseded by a newer request.
  pub fn is_superseded(&self) -> bool {
    self.cancel.is_cancelled()
  }

  /// The outcome, if the execution has already finished.
  pub fn outcome(&self) -> Option<Result<T, JobError>> {
    self.outcome.borrow().clone()
  }

  /// Wait for the execution to finish.
  ///
  /// Returns [`JobError::Abandoned`] when the execution was dropped before it
  /// could produce an outcome.
  pub async fn wait(mut self) -> Result<T, JobError> {
    loop {
      if let Some(outcome) = self.outcome.borrow_and_update().clone() {
        return outcome;
      }
      if self.outcome.changed().await.is_err() {
        // Sender dropped without publishing: the execution never ran.
        return self.outcome.borrow().clone().unwrap_or(Err(JobError::Abandoned));
      }
    }
  }
}
