//! Job execution under configurable concurrency strategies.
//!
//! A [`Process`] accepts jobs (caller-supplied zero-argument async units of
//! work), runs them under a fixed [`Strategy`], and exposes three shared
//! signals derived from the overlapping executions: `busy`, `error`, and
//! `result`. Every `execute` call additionally returns an [`ExecutionHandle`]
//! resolving with that job's own outcome, independent of how the aggregate
//! signals treat the execution.
//!
//! The engine performs no I/O of its own and imposes no timeouts; jobs are
//! ordinary futures and remain in full control of their own work.

mod config;
mod error;
mod handle;
mod hook;
mod process;
mod runner;
mod strategy;

pub use conflux_signal::ExecutionId;

pub use config::ProcessConfig;
pub use error::{JobError, ProcessError};
pub use handle::ExecutionHandle;
pub use hook::{FailureHook, NoopHook};
pub use process::Process;
pub use strategy::Strategy;
