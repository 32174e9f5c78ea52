//! Recognized configuration keys (§6 External interfaces). Grounded on the
//! teacher's `live::config` module, but scoped down to exactly the keys the
//! specification names — this engine does not carry the teacher's full node
//! configuration surface (data/risk engine configs, streaming, msgbus, ...).

use serde::{Deserialize, Serialize};

/// Reconciliation timing. Keys: `reconciliation.timeout_secs`,
/// `reconciliation.poll_interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationConfig {
    /// Overall timeout for `reconcile_state` to converge.
    pub timeout_secs: u64,
    /// Sleep between reconciliation passes.
    pub poll_interval_ms: u64,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            poll_interval_ms: 1,
        }
    }
}

/// Top-level engine configuration. Key: `qsize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The engine's bounded command/event queue capacity.
    pub qsize: usize,
    pub reconciliation: ReconciliationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qsize: 10_000,
            reconciliation: ReconciliationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parses configuration from TOML text; unrecognized keys are rejected by
    /// `serde`'s default (non-`deny_unknown_fields`) behaviour, i.e. ignored,
    /// matching "recognized keys only" rather than "exhaustive keys only".
    ///
    /// # Errors
    ///
    /// Returns an error if `text` is not valid TOML or a recognized key has the
    /// wrong type.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    #[must_use]
    pub fn reconciliation_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.reconciliation.timeout_secs)
    }

    #[must_use]
    pub fn reconciliation_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.reconciliation.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_defaults_match_spec() {
        let config = EngineConfig::default();
        assert_eq!(config.qsize, 10_000);
        assert_eq!(config.reconciliation.timeout_secs, 10);
        assert_eq!(config.reconciliation.poll_interval_ms, 1);
    }

    #[rstest]
    fn test_from_toml_overrides_recognized_keys() {
        let config = EngineConfig::from_toml(
            r#"
            qsize = 2

            [reconciliation]
            timeout_secs = 30
            poll_interval_ms = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.qsize, 2);
        assert_eq!(config.reconciliation.timeout_secs, 30);
        assert_eq!(config.reconciliation.poll_interval_ms, 5);
    }

    #[rstest]
    fn test_from_toml_partial_overrides_fill_defaults() {
        let config = EngineConfig::from_toml("qsize = 4").unwrap();
        assert_eq!(config.qsize, 4);
        assert_eq!(config.reconciliation.timeout_secs, 10);
    }
}
