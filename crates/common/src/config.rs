//! Common configuration types for Media Gateway components.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Default log level when `LOG_LEVEL` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log levels accepted by `LOG_LEVEL`.
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Errors raised while reading observability settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObservabilityConfigError {
    #[error("Invalid LOG_LEVEL: {0}")]
    InvalidLogLevel(String),

    #[error("Invalid LOG_FORMAT: {0}")]
    InvalidLogFormat(String),
}

/// Observability configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Enable JSON-formatted logs
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            json_logs: false,
        }
    }
}

impl ObservabilityConfig {
    /// Read `LOG_LEVEL` and `LOG_FORMAT` from a variable map.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable holds an unrecognised value.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ObservabilityConfigError> {
        let log_level = match vars.get("LOG_LEVEL") {
            Some(level) => {
                let level = level.to_ascii_lowercase();
                if !LOG_LEVELS.contains(&level.as_str()) {
                    return Err(ObservabilityConfigError::InvalidLogLevel(format!(
                        "expected one of {LOG_LEVELS:?}, got '{level}'"
                    )));
                }
                level
            }
            None => DEFAULT_LOG_LEVEL.to_string(),
        };

        let json_logs = match vars.get("LOG_FORMAT").map(|f| f.to_ascii_lowercase()) {
            None => false,
            Some(format) if format == "text" => false,
            Some(format) if format == "json" => true,
            Some(other) => {
                return Err(ObservabilityConfigError::InvalidLogFormat(format!(
                    "expected 'text' or 'json', got '{other}'"
                )))
            }
        };

        Ok(Self {
            log_level,
            json_logs,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = ObservabilityConfig::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config, ObservabilityConfig::default());
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_json_format_is_case_insensitive() {
        let config = ObservabilityConfig::from_vars(&vars(&[("LOG_FORMAT", "JSON")])).unwrap();
        assert!(config.json_logs);
    }

    #[test]
    fn test_log_level_is_normalised() {
        let config = ObservabilityConfig::from_vars(&vars(&[("LOG_LEVEL", "DEBUG")])).unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let result = ObservabilityConfig::from_vars(&vars(&[("LOG_LEVEL", "verbose")]));
        assert!(matches!(
            result,
            Err(ObservabilityConfigError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let result = ObservabilityConfig::from_vars(&vars(&[("LOG_FORMAT", "xml")]));
        assert!(matches!(
            result,
            Err(ObservabilityConfigError::InvalidLogFormat(_))
        ));
    }
}
