//! Media Gateway configuration.
//!
//! Configuration is loaded from environment variables. The media server
//! secret is redacted in Debug output.

use crate::models::ServerDescriptor;
use crate::servers::{AdapterOptions, DEFAULT_REQUEST_TIMEOUT_SECS};
use common::config::{ObservabilityConfig, ObservabilityConfigError};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Longest accepted request timeout in seconds.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Default signaling transport when a locator carries no override.
pub const DEFAULT_SIGNALING_SCHEME: &str = "http";

/// Media Gateway configuration.
#[derive(Clone)]
pub struct Config {
    /// Server type tag (e.g. "srs", "ZLM"), dispatched case-insensitively.
    pub server_type: String,

    /// Media server API host.
    pub server_host: String,

    /// Media server API port.
    pub server_port: u16,

    /// Shared API secret (ZLM only).
    pub server_secret: Option<SecretString>,

    /// Timeout for vendor REST and signaling requests in seconds (default: 10).
    pub http_timeout_seconds: u64,

    /// Signaling transport used when a locator has no `schema` parameter.
    pub signaling_default_scheme: String,

    pub observability: ObservabilityConfig,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_type", &self.server_type)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field(
                "server_secret",
                &self.server_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("http_timeout_seconds", &self.http_timeout_seconds)
            .field("signaling_default_scheme", &self.signaling_default_scheme)
            .field("observability", &self.observability)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid media server port: {0}")]
    InvalidPort(String),

    #[error("Invalid HTTP timeout configuration: {0}")]
    InvalidTimeout(String),

    #[error("Invalid signaling scheme: {0}")]
    InvalidScheme(String),

    #[error(transparent)]
    Observability(#[from] ObservabilityConfigError),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let server_type = required(vars, "MEDIA_SERVER_TYPE")?;
        let server_host = required(vars, "MEDIA_SERVER_HOST")?;

        let port_str = required(vars, "MEDIA_SERVER_PORT")?;
        let server_port: u16 = port_str.parse().map_err(|e| {
            ConfigError::InvalidPort(format!(
                "MEDIA_SERVER_PORT must be an integer in 1..=65535, got '{port_str}': {e}"
            ))
        })?;
        if server_port == 0 {
            return Err(ConfigError::InvalidPort(
                "MEDIA_SERVER_PORT must be greater than 0".to_string(),
            ));
        }

        let server_secret = vars
            .get("MEDIA_SERVER_SECRET")
            .filter(|s| !s.is_empty())
            .map(|s| SecretString::from(s.clone()));

        // Parse request timeout with validation
        let http_timeout_seconds = if let Some(value_str) = vars.get("MEDIA_HTTP_TIMEOUT_SECONDS") {
            let value: u64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidTimeout(format!(
                    "MEDIA_HTTP_TIMEOUT_SECONDS must be a valid positive integer, got '{value_str}': {e}"
                ))
            })?;

            if value == 0 {
                return Err(ConfigError::InvalidTimeout(
                    "MEDIA_HTTP_TIMEOUT_SECONDS must be greater than 0".to_string(),
                ));
            }

            if value > MAX_REQUEST_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout(format!(
                    "MEDIA_HTTP_TIMEOUT_SECONDS must not exceed {MAX_REQUEST_TIMEOUT_SECS} seconds, got {value}"
                )));
            }

            value
        } else {
            DEFAULT_REQUEST_TIMEOUT_SECS
        };

        let signaling_default_scheme = match vars.get("SIGNALING_DEFAULT_SCHEME") {
            Some(value) => {
                let scheme = value.trim().trim_end_matches(':').to_ascii_lowercase();
                if scheme != "http" && scheme != "https" {
                    return Err(ConfigError::InvalidScheme(format!(
                        "SIGNALING_DEFAULT_SCHEME must be 'http' or 'https', got '{value}'"
                    )));
                }
                scheme
            }
            None => DEFAULT_SIGNALING_SCHEME.to_string(),
        };

        let observability = ObservabilityConfig::from_vars(vars)?;

        Ok(Config {
            server_type,
            server_host,
            server_port,
            server_secret,
            http_timeout_seconds,
            signaling_default_scheme,
            observability,
        })
    }

    /// Descriptor of the configured media server.
    #[must_use]
    pub fn descriptor(&self) -> ServerDescriptor {
        let descriptor = ServerDescriptor::new(
            self.server_type.clone(),
            self.server_host.clone(),
            self.server_port,
        );
        match &self.server_secret {
            Some(secret) => descriptor.with_secret(secret.clone()),
            None => descriptor,
        }
    }

    /// Adapter options derived from the timeout and scheme settings.
    #[must_use]
    pub fn adapter_options(&self) -> AdapterOptions {
        AdapterOptions {
            timeout: Duration::from_secs(self.http_timeout_seconds),
            default_scheme: self.signaling_default_scheme.clone(),
        }
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}
