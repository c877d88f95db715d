//! Process configuration.

use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

/// Configuration for a [`Process`](crate::Process).
///
/// Plain serializable data; an embedder can load it from JSON alongside its
/// own configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessConfig {
  /// Concurrency strategy. Defaults to `parallel`.
  #[serde(default)]
  pub strategy: Strategy,
  /// When set, the first job failure terminates the aggregate result stream
  /// and forces the busy signal idle. Defaults to `false`.
  #[serde(default)]
  pub fail_fast: bool,
}

impl ProcessConfig {
  /// Configuration with the given strategy and `fail_fast` off.
  pub fn new(strategy: Strategy) -> Self {
    Self { strategy, fail_fast: false }
  }

  /// Toggle fail-fast behavior.
  pub fn fail_fast(mut self, fail_fast: bool) -> Self {
    self.fail_fast = fail_fast;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_parallel_without_fail_fast() {
    let config = ProcessConfig::default();
    assert_eq!(config.strategy, Strategy::Parallel);
    assert!(!config.fail_fast);
  }

  #[test]
  fn deserializes_with_defaults() {
    let config: ProcessConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ProcessConfig::default());

    let config: ProcessConfig =
      serde_json::from_str(r#"{"strategy": "queue", "fail_fast": true}"#).unwrap();
    assert_eq!(config.strategy, Strategy::Queue);
    assert!(config.fail_fast);
  }
}
