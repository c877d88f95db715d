//! CRUD composition: one read resource plus three mutation processes.

use std::future::Future;
use std::sync::Arc;

use conflux_process::{ExecutionHandle, JobError, Process, ProcessConfig, Strategy};
use conflux_signal::Signal;
use futures::future::BoxFuture;
use tokio::sync::watch;
use tracing::debug;

use crate::resource::Resource;

/// A read [`Resource`] composed with three independent `parallel` mutation
/// processes (create, update, delete).
///
/// A successful mutation re-issues the last-used load argument so the read
/// model catches up with the write.
/// [`is_processing`](CrudResource::is_processing) is true while any of the
/// four parts is busy, and
/// [`processing_error`](CrudResource::processing_error) carries the first
/// present error among them.
///
/// `M` is the mutation result type, `()` when mutations carry no payload.
pub struct CrudResource<A, T, M = ()> {
  read: Arc<Resource<A, T>>,
  create: Process<M>,
  update: Process<M>,
  delete: Process<M>,
  processing: watch::Receiver<bool>,
  processing_error: watch::Receiver<Option<JobError>>,
}

impl<A, T, M> CrudResource<A, T, M>
where
  A: Clone + Send + 'static,
  T: Clone + Send + Sync + 'static,
  M: Clone + Send + Sync + 'static,
{
  /// Create a CRUD resource with the given read configuration and loader.
  ///
  /// The mutation processes are always `parallel`; only the read side takes
  /// a strategy.
  pub fn new<F, Fut>(config: ProcessConfig, loader: F) -> Self
  where
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, JobError>> + Send + 'static,
  {
    let read = Arc::new(Resource::new(config, loader));
    let create = Process::with_strategy(Strategy::Parallel);
    let update = Process::with_strategy(Strategy::Parallel);
    let delete = Process::with_strategy(Strategy::Parallel);

    let (processing, processing_error) = spawn_combiner(
      vec![read.busy(), create.busy(), update.busy(), delete.busy()],
      vec![read.error(), create.error(), update.error(), delete.error()],
    );

    Self { read, create, update, delete, processing, processing_error }
  }

  /// Load the read model. See [`Resource::load`].
  pub fn load(&self, arg: A) -> ExecutionHandle<T> {
    self.read.load(arg)
  }

  /// Re-issue the last load argument, if any.
  pub fn reload(&self) -> Option<ExecutionHandle<T>> {
    self.read.reload()
  }

  /// Latest loaded value, replayed to every subscriber.
  pub fn data(&self) -> watch::Receiver<Option<T>> {
    self.read.data()
  }

  /// Run a create mutation; reloads the read model on success.
  pub fn create<F, Fut>(&self, job: F) -> ExecutionHandle<M>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<M, JobError>> + Send + 'static,
  {
    self.mutate(&self.create, job)
  }

  /// Run an update mutation; reloads the read model on success.
  pub fn update<F, Fut>(&self, job: F) -> ExecutionHandle<M>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<M, JobError>> + Send + 'static,
  {
    self.mutate(&self.update, job)
  }

  /// Run a delete mutation; reloads the read model on success.
  pub fn delete<F, Fut>(&self, job: F) -> ExecutionHandle<M>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<M, JobError>> + Send + 'static,
  {
    self.mutate(&self.delete, job)
  }

  /// True while any of the four processes is busy.
  pub fn is_processing(&self) -> watch::Receiver<bool> {
    self.processing.clone()
  }

  /// First present error among the four processes, in read-before-mutations
  /// order.
  pub fn processing_error(&self) -> watch::Receiver<Option<JobError>> {
    self.processing_error.clone()
  }

  fn mutate<F, Fut>(&self, process: &Process<M>, job: F) -> ExecutionHandle<M>
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<M, JobError>> + Send + 'static,
  {
    let handle = process.execute(job);

    let read = Arc::clone(&self.read);
    let waiter = handle.clone();
    tokio::spawn(async move {
      if waiter.wait().await.is_ok() {
        debug!("mutation succeeded, reloading");
        read.reload();
      }
    });

    handle
  }
}

/// Derive any-busy and first-error signals over the four parts.
///
/// The combiner task recomputes on every input change and exits once the
/// composition is torn down (any input channel closed).
fn spawn_combiner(
  mut busy: Vec<watch::Receiver<bool>>,
  mut errors: Vec<watch::Receiver<Option<JobError>>>,
) -> (watch::Receiver<bool>, watch::Receiver<Option<JobError>>) {
  let busy_signal = Signal::new(false);
  let error_signal: Signal<Option<JobError>> = Signal::new(None);
  let busy_rx = busy_signal.subscribe();
  let error_rx = error_signal.subscribe();

  tokio::spawn(async move {
    loop {
      // Read through `borrow_and_update` on every receiver so no update can
      // slip in unseen between the read and the wait below.
      let mut any_busy = false;
      for rx in busy.iter_mut() {
        any_busy |= *rx.borrow_and_update();
      }
      busy_signal.set_if_changed(any_busy);

      let mut first_error = None;
      for rx in errors.iter_mut() {
        let error = rx.borrow_and_update().clone();
        if first_error.is_none() {
          first_error = error;
        }
      }
      error_signal.set_if_changed(first_error);

      let waits: Vec<BoxFuture<'_, Result<(), watch::error::RecvError>>> = busy
        .iter_mut()
        .map(|rx| Box::pin(rx.changed()) as BoxFuture<'_, _>)
        .chain(errors.iter_mut().map(|rx| Box::pin(rx.changed()) as BoxFuture<'_, _>))
        .collect();
      let (changed, _, _) = futures::future::select_all(waits).await;
      if changed.is_err() {
        break;
      }
    }
  });

  (busy_rx, error_rx)
}
