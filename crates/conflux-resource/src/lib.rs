//! Reloadable read models built on conflux processes.
//!
//! A [`Resource`] wraps one process and a load function, turning explicit job
//! calls into a stream of load arguments with a replayed `data` signal. A
//! [`CrudResource`] composes a read resource with three independent parallel
//! mutation processes and reloads the read model after every successful
//! mutation.

mod crud;
mod resource;

pub use crud::CrudResource;
pub use resource::Resource;
