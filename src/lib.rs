//! Conflux
//!
//! Concurrency control and derived-state aggregation for asynchronous jobs.
//! Jobs run under a configurable strategy while shared busy/error/result
//! signals stay observable for any number of consumers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Resource / CrudResource                 │
//! │  - load(arg) feeds the read process                         │
//! │  - data replays the latest loaded value                     │
//! │  - mutations reload the read model on success               │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Process                            │
//! │  - execute(job) → ExecutionHandle (the caller's own view)   │
//! │  - busy / error / result (the shared aggregate view)        │
//! │  - one runner task per process applies all transitions      │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │              ProgressTracker / ErrorChannel / Signal        │
//! │  - watch-backed, change-only, late-subscriber replay        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use conflux::{Process, ProcessConfig, Strategy};
//!
//! let process: Process<Account> = Process::with_strategy(Strategy::Latest);
//!
//! // The caller's own view of this request:
//! let handle = process.execute(|| fetch_account(id));
//!
//! // The shared view, for any number of subscribers:
//! let mut busy = process.busy();
//! let mut result = process.result();
//!
//! let account = handle.wait().await?;
//! ```

pub use conflux_process::{
  ExecutionHandle, ExecutionId, FailureHook, JobError, NoopHook, Process, ProcessConfig,
  ProcessError, Strategy,
};
pub use conflux_resource::{CrudResource, Resource};
pub use conflux_signal::{ErrorChannel, ProgressTracker, Signal};
