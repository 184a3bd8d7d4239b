//! Harness configuration.

use serde::{Deserialize, Serialize};

use crate::errors::HarnessError;

/// Default timeout for asynchronous cases, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Configuration fixed for the lifetime of one test-file run.
///
/// Constructed by the embedding driver and handed to the harness; there is
/// no process-global state. `Harness::configure` may replace it, but only
/// before the first test starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// When true the file defines exactly one implicit test; explicit
    /// registration is rejected.
    pub single_test: bool,
    /// Maximum wait before a pending asynchronous case is finalized as
    /// timed out.
    pub timeout_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            single_test: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HarnessConfig {
    /// Select single-test mode.
    pub fn single_test(mut self, single_test: bool) -> Self {
        self.single_test = single_test;
        self
    }

    /// Override the asynchronous-case timeout.
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Parse a configuration from runner-supplied TOML.
    pub fn from_toml_str(input: &str) -> Result<Self, HarnessError> {
        toml::from_str(input).map_err(|e| HarnessError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_driver_contract() {
        let config = HarnessConfig::default();
        assert!(!config.single_test);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn toml_round_trip() {
        let config = HarnessConfig::from_toml_str("single_test = true\ntimeout_ms = 500\n")
            .expect("parse config");
        assert!(config.single_test);
        assert_eq!(config.timeout_ms, 500);
    }

    #[test]
    fn toml_fields_are_optional() {
        let config = HarnessConfig::from_toml_str("").expect("parse empty config");
        assert_eq!(config, HarnessConfig::default());
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = HarnessConfig::from_toml_str("timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, HarnessError::Config { .. }));
    }
}
