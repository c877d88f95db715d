//! Execution identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier minted for every execution request.
///
/// Cheap to copy and usable as a map key; rendered as a uuid in log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(Uuid);

impl ExecutionId {
  /// Mint a fresh identifier.
  pub fn new() -> Self {
    Self(Uuid::new_v4())
  }
}

impl Default for ExecutionId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for ExecutionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}
