//! Failure reporting hooks.

use crate::error::JobError;

/// Escape hatch for forwarding job failures to an external reporting
/// mechanism (crash reporter, global error handler).
///
/// The runner calls [`report`](FailureHook::report) once per failing,
/// non-superseded execution, after the failure has been applied to the error
/// signal. Reporting is strictly additive: nothing in the engine depends on
/// what a hook does.
pub trait FailureHook: Send + Sync {
  /// Called for each job failure.
  fn report(&self, error: &JobError);
}

/// Discards all reports. The default hook.
#[derive(Debug, Clone, Default)]
pub struct NoopHook;

impl FailureHook for NoopHook {
  fn report(&self, _error: &JobError) {
    // Intentionally empty
  }
}
