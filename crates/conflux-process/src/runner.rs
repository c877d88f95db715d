//! Strategy dispatch loop.
//!
//! One runner task owns the progress tracker, error channel, and result
//! signal. Jobs run on spawned tasks and report back over a completion
//! channel, so every observable transition is applied by a single writer and
//! no subscriber can see a partially-applied transition. Request arrival
//! order is preserved by the request channel; per execution, the start
//! transition is always applied before the end transition.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use conflux_signal::{ErrorChannel, ExecutionId, ProgressTracker, Signal};
use futures::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::config::ProcessConfig;
use crate::error::JobError;
use crate::handle::Outcome;
use crate::hook::FailureHook;
use crate::strategy::Strategy;

pub(crate) type JobFuture<T> = BoxFuture<'static, Result<T, JobError>>;

/// One execution request as it travels to the runner.
pub(crate) struct ExecutionRequest<T> {
  pub id: ExecutionId,
  pub job: JobFuture<T>,
  pub outcome: watch::Sender<Outcome<T>>,
  pub cancel: CancellationToken,
}

struct Completion<T> {
  id: ExecutionId,
  outcome: Result<T, JobError>,
}

/// Whether the dispatch loop keeps serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
  Continue,
  Stop,
}

/// Endpoints the process façade keeps after spawning a runner.
pub(crate) struct RunnerChannels<T> {
  pub requests: mpsc::UnboundedSender<ExecutionRequest<T>>,
  pub busy: watch::Receiver<bool>,
  pub errors: watch::Receiver<Option<JobError>>,
  pub result: watch::Receiver<Option<T>>,
}

/// Spawn a runner for the given configuration.
pub(crate) fn spawn<T>(
  config: ProcessConfig,
  hook: Arc<dyn FailureHook>,
  cancel: CancellationToken,
) -> RunnerChannels<T>
where
  T: Clone + Send + Sync + 'static,
{
  let (request_tx, request_rx) = mpsc::unbounded_channel();
  let (completion_tx, completion_rx) = mpsc::unbounded_channel();

  // Under `latest` a superseded execution's late completion must not report
  // idle while a newer one is outstanding, hence the slot tracker.
  let progress = match config.strategy {
    Strategy::Latest => ProgressTracker::slots(),
    Strategy::Parallel | Strategy::Queue => ProgressTracker::counting(),
  };
  let errors = ErrorChannel::new();
  let result = Signal::new(None);

  let channels = RunnerChannels {
    requests: request_tx,
    busy: progress.subscribe(),
    errors: errors.subscribe(),
    result: result.subscribe(),
  };

  let dispatch: Box<dyn Dispatch<T>> = match config.strategy {
    Strategy::Parallel => Box::new(ParallelDispatch),
    Strategy::Queue => Box::new(QueueDispatch::new()),
    Strategy::Latest => Box::new(LatestDispatch::new()),
  };

  let runner = Runner {
    core: RunnerCore {
      progress,
      errors,
      result,
      completions: completion_tx,
      fail_fast: config.fail_fast,
      hook,
      outstanding: 0,
    },
    dispatch,
    requests: request_rx,
    completions: completion_rx,
    cancel,
    strategy: config.strategy,
  };
  tokio::spawn(runner.run());

  channels
}

/// The single writer over all aggregate state.
struct RunnerCore<T> {
  progress: ProgressTracker,
  errors: ErrorChannel<JobError>,
  result: Signal<Option<T>>,
  completions: mpsc::UnboundedSender<Completion<T>>,
  fail_fast: bool,
  hook: Arc<dyn FailureHook>,
  outstanding: usize,
}

impl<T: Clone + Send + Sync + 'static> RunnerCore<T> {
  /// Start an execution: register it, reset the error slot, run the job.
  fn start(&mut self, req: ExecutionRequest<T>) {
    debug!(execution_id = %req.id, "execution started");
    self.progress.start(req.id);
    self.errors.clear();
    self.outstanding += 1;

    let completions = self.completions.clone();
    let id = req.id;
    let outcome_tx = req.outcome;
    let job = req.job;
    tokio::spawn(async move {
      let outcome = job.await;
      // Resolve the caller's handle first: the aggregate view may discard
      // this completion (supersession), the handle never does.
      outcome_tx.send_replace(Some(outcome.clone()));
      let _ = completions.send(Completion { id, outcome });
    });
  }

  /// Publish a finished execution into the aggregate signals.
  fn finish(&mut self, done: Completion<T>) -> Flow {
    self.outstanding -= 1;
    self.progress.end(done.id);
    match done.outcome {
      Ok(value) => {
        debug!(execution_id = %done.id, "execution completed");
        self.result.set(Some(value));
        Flow::Continue
      }
      Err(err) => {
        error!(execution_id = %done.id, error = %err, "execution failed");
        self.errors.set(err.clone());
        self.hook.report(&err);
        if self.fail_fast {
          self.progress.force_idle();
          Flow::Stop
        } else {
          Flow::Continue
        }
      }
    }
  }

  /// Drop a superseded execution's completion: it no longer counts toward
  /// aggregate result/error, but its progress slot is still closed.
  fn discard(&mut self, done: Completion<T>) {
    debug!(execution_id = %done.id, "superseded execution finished");
    self.outstanding -= 1;
    self.progress.end(done.id);
  }

  fn idle(&self) -> bool {
    self.outstanding == 0
  }
}

/// Per-strategy request/completion handling over the shared core.
trait Dispatch<T>: Send {
  fn on_request(&mut self, req: ExecutionRequest<T>, core: &mut RunnerCore<T>);
  fn on_completion(&mut self, done: Completion<T>, core: &mut RunnerCore<T>) -> Flow;

  /// Requests accepted but not yet started.
  fn has_pending(&self) -> bool {
    false
  }
}

/// Every request starts immediately.
struct ParallelDispatch;

impl<T: Clone + Send + Sync + 'static> Dispatch<T> for ParallelDispatch {
  fn on_request(&mut self, req: ExecutionRequest<T>, core: &mut RunnerCore<T>) {
    core.start(req);
  }

  fn on_completion(&mut self, done: Completion<T>, core: &mut RunnerCore<T>) -> Flow {
    core.finish(done)
  }
}

/// Strict arrival order, one execution at a time.
struct QueueDispatch<T> {
  active: Option<ExecutionId>,
  pending: VecDeque<ExecutionRequest<T>>,
}

impl<T> QueueDispatch<T> {
  fn new() -> Self {
    Self { active: None, pending: VecDeque::new() }
  }
}

impl<T: Clone + Send + Sync + 'static> Dispatch<T> for QueueDispatch<T> {
  fn on_request(&mut self, req: ExecutionRequest<T>, core: &mut RunnerCore<T>) {
    if self.active.is_some() {
      debug!(execution_id = %req.id, waiting = self.pending.len(), "execution queued");
      self.pending.push_back(req);
    } else {
      self.active = Some(req.id);
      core.start(req);
    }
  }

  fn on_completion(&mut self, done: Completion<T>, core: &mut RunnerCore<T>) -> Flow {
    if self.active == Some(done.id) {
      self.active = None;
    }
    // A failure does not abort the queue; the next request still runs.
    if core.finish(done) == Flow::Stop {
      return Flow::Stop;
    }
    if self.active.is_none() {
      if let Some(next) = self.pending.pop_front() {
        self.active = Some(next.id);
        core.start(next);
      }
    }
    Flow::Continue
  }

  fn has_pending(&self) -> bool {
    !self.pending.is_empty()
  }
}

/// Only the newest request feeds the aggregate signals.
struct LatestDispatch {
  active: Option<(ExecutionId, CancellationToken)>,
  superseded: HashSet<ExecutionId>,
}

impl LatestDispatch {
  fn new() -> Self {
    Self { active: None, superseded: HashSet::new() }
  }
}

impl<T: Clone + Send + Sync + 'static> Dispatch<T> for LatestDispatch {
  fn on_request(&mut self, req: ExecutionRequest<T>, core: &mut RunnerCore<T>) {
    if let Some((prev, cancel)) = self.active.take() {
      debug!(execution_id = %prev, "execution superseded");
      cancel.cancel();
      self.superseded.insert(prev);
    }
    self.active = Some((req.id, req.cancel.clone()));
    core.start(req);
  }

  fn on_completion(&mut self, done: Completion<T>, core: &mut RunnerCore<T>) -> Flow {
    if self.superseded.remove(&done.id) {
      core.discard(done);
      return Flow::Continue;
    }
    if self.active.as_ref().map(|(id, _)| *id) == Some(done.id) {
      self.active = None;
    }
    core.finish(done)
  }
}

struct Runner<T> {
  core: RunnerCore<T>,
  dispatch: Box<dyn Dispatch<T>>,
  requests: mpsc::UnboundedReceiver<ExecutionRequest<T>>,
  completions: mpsc::UnboundedReceiver<Completion<T>>,
  cancel: CancellationToken,
  strategy: Strategy,
}

impl<T: Clone + Send + Sync + 'static> Runner<T> {
  /// Serve requests until cancelled, stopped by a fail-fast failure, or the
  /// process is dropped and the outstanding executions have drained.
  ///
  /// Exiting drops the signal senders, which is what terminates the
  /// aggregate streams for all subscribers.
  #[instrument(name = "process_runner", skip(self), fields(strategy = ?self.strategy))]
  async fn run(mut self) {
    info!("runner started");
    let mut accepting = true;
    loop {
      tokio::select! {
        _ = self.cancel.cancelled() => {
          debug!("runner cancelled");
          break;
        }
        request = self.requests.recv(), if accepting => match request {
          Some(req) => self.dispatch.on_request(req, &mut self.core),
          None => {
            // Process dropped; finish what is outstanding, then exit.
            accepting = false;
            if self.core.idle() && !self.dispatch.has_pending() {
              break;
            }
          }
        },
        Some(done) = self.completions.recv() => {
          if self.dispatch.on_completion(done, &mut self.core) == Flow::Stop {
            debug!("runner stopped after failure");
            break;
          }
          if !accepting && self.core.idle() && !self.dispatch.has_pending() {
            break;
          }
        }
      }
    }
    info!("runner exited");
  }
}
