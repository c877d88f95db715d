//! Signal primitives for the conflux engine.
//!
//! This crate provides the leaf building blocks the process engine derives its
//! observable state from:
//!
//! - [`Signal`] - a shared last-value signal over a `tokio::sync::watch` channel
//! - [`ExecutionId`] - opaque identifier minted per execution request
//! - [`ProgressTracker`] - busy/idle derived from outstanding executions
//! - [`ErrorChannel`] - last-error slot with change-only notification
//!
//! All of these are single-writer: one runner task applies transitions, any
//! number of subscribers observe them through cloned watch receivers.

mod error_channel;
mod id;
mod progress;
mod signal;

pub use error_channel::ErrorChannel;
pub use id::ExecutionId;
pub use progress::ProgressTracker;
pub use signal::Signal;
