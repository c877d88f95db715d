//! Busy/idle tracking derived from outstanding executions.

use std::collections::HashSet;

use tokio::sync::watch;
use tracing::debug;

use crate::id::ExecutionId;
use crate::signal::Signal;

/// Derives a boolean busy signal from execution start/end transitions.
///
/// Two variants exist because "busy" means different things under different
/// concurrency strategies:
///
/// - [`ProgressTracker::counting`]: busy while any execution is alive. Used
///   where every execution counts (parallel, queue).
/// - [`ProgressTracker::slots`]: busy while the most recently started
///   execution is unfinished. Used where an older, superseded execution's
///   late completion must not report idle while a newer one is outstanding
///   (latest).
///
/// `end` for an unknown identifier is ignored, so the derived state can never
/// go negative or flip idle spuriously. Busy updates are change-only: an
/// execution that starts and finishes within one scheduling turn is never
/// observed toggling busy by a subscriber polling the watch channel.
pub struct ProgressTracker {
  state: State,
  busy: Signal<bool>,
}

enum State {
  Counting { alive: HashSet<ExecutionId> },
  Slots { runs: Vec<(ExecutionId, bool)> },
}

impl ProgressTracker {
  /// Tracker that is busy while any execution is alive.
  pub fn counting() -> Self {
    Self {
      state: State::Counting { alive: HashSet::new() },
      busy: Signal::new(false),
    }
  }

  /// Tracker that is busy while the most recently started execution is open.
  pub fn slots() -> Self {
    Self {
      state: State::Slots { runs: Vec::new() },
      busy: Signal::new(false),
    }
  }

  /// Register the start of an execution.
  pub fn start(&mut self, id: ExecutionId) {
    match &mut self.state {
      State::Counting { alive } => {
        alive.insert(id);
      }
      State::Slots { runs } => runs.push((id, false)),
    }
    self.publish();
  }

  /// Register the end of an execution. Unknown identifiers are ignored.
  pub fn end(&mut self, id: ExecutionId) {
    match &mut self.state {
      State::Counting { alive } => {
        alive.remove(&id);
      }
      State::Slots { runs } => {
        if let Some(run) = runs.iter_mut().rev().find(|run| run.0 == id && !run.1) {
          run.1 = true;
        }
        // Once every slot is closed the history carries no information.
        if runs.iter().all(|run| run.1) {
          runs.clear();
        }
      }
    }
    self.publish();
  }

  /// Drop all outstanding state and report idle (fail-fast termination).
  pub fn force_idle(&mut self) {
    match &mut self.state {
      State::Counting { alive } => alive.clear(),
      State::Slots { runs } => runs.clear(),
    }
    self.publish();
  }

  /// Current busy state.
  pub fn is_busy(&self) -> bool {
    self.busy.get()
  }

  /// Subscribe to busy transitions.
  pub fn subscribe(&self) -> watch::Receiver<bool> {
    self.busy.subscribe()
  }

  fn current(&self) -> bool {
    match &self.state {
      State::Counting { alive } => !alive.is_empty(),
      State::Slots { runs } => runs.last().map(|run| !run.1).unwrap_or(false),
    }
  }

  fn publish(&mut self) {
    let busy = self.current();
    if self.busy.set_if_changed(busy) {
      debug!(busy, "busy changed");
    }
  }
}
