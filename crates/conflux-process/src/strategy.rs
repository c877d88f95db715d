//! Concurrency strategies.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

/// Concurrency policy governing how overlapping execution requests interact.
///
/// Fixed for the lifetime of a process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
  /// Every request starts immediately; results interleave in completion order.
  #[default]
  Parallel,
  /// Requests execute strictly in arrival order, one at a time; the next
  /// request starts only after the previous execution finishes.
  Queue,
  /// Only the most recently requested execution feeds the aggregate signals;
  /// an older in-flight execution is superseded.
  Latest,
}

impl FromStr for Strategy {
  type Err = ProcessError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "parallel" => Ok(Self::Parallel),
      "queue" => Ok(Self::Queue),
      "latest" => Ok(Self::Latest),
      other => Err(ProcessError::InvalidStrategy { name: other.to_string() }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_known_strategies() {
    assert_eq!("parallel".parse::<Strategy>().unwrap(), Strategy::Parallel);
    assert_eq!("queue".parse::<Strategy>().unwrap(), Strategy::Queue);
    assert_eq!("latest".parse::<Strategy>().unwrap(), Strategy::Latest);
  }

  #[test]
  fn rejects_unknown_strategy() {
    let err = "fanout".parse::<Strategy>().unwrap_err();
    assert!(matches!(err, ProcessError::InvalidStrategy { name } if name == "fanout"));
  }

  #[test]
  fn serde_uses_snake_case() {
    let json = serde_json::to_string(&Strategy::Latest).unwrap();
    assert_eq!(json, "\"latest\"");
    let back: Strategy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Strategy::Latest);
  }
}
