//! Process and job errors.

use std::sync::Arc;

/// Errors raised by process configuration.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
  /// Unknown strategy name.
  #[error("invalid strategy '{name}', expected one of: parallel, queue, latest")]
  InvalidStrategy { name: String },
}

/// A job's failure, cheap to clone and share across signals and handles.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JobError {
  /// The job's own asynchronous failure.
  #[error("job failed: {0}")]
  Failed(Arc<dyn std::error::Error + Send + Sync>),

  /// The execution was dropped before it could run (process shut down or
  /// stopped by an earlier fail-fast failure).
  #[error("execution abandoned before completion")]
  Abandoned,
}

impl JobError {
  /// Wrap an error as a job failure.
  pub fn new<E>(error: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Failed(Arc::new(error))
  }

  /// Create a job failure from a plain message.
  pub fn msg(message: impl Into<String>) -> Self {
    Self::Failed(Arc::new(Message(message.into())))
  }
}

/// Equality is identity for failures: the same failure observed twice compares
/// equal, two distinct failures never do. This keeps the error channel's
/// change-only comparison cheap.
impl PartialEq for JobError {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Self::Failed(a), Self::Failed(b)) => Arc::ptr_eq(a, b),
      (Self::Abandoned, Self::Abandoned) => true,
      _ => false,
    }
  }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct Message(String);

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn displays_wrapped_message() {
    let err = JobError::msg("connection refused");
    assert_eq!(err.to_string(), "job failed: connection refused");
  }

  #[test]
  fn equality_is_identity() {
    let a = JobError::msg("boom");
    let b = JobError::msg("boom");
    assert_eq!(a, a.clone());
    assert_ne!(a, b);
    assert_eq!(JobError::Abandoned, JobError::Abandoned);
    assert_ne!(a, JobError::Abandoned);
  }
}
