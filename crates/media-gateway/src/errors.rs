//! Media Gateway error types.
//!
//! Adapters wrap transport and decoding failures with the name of the
//! operation that failed ("get SRS streams", "kick SRS client", ...) so a
//! caller can report which call broke without knowing the vendor. No variant
//! is retried internally; retry policy belongs to the caller.

use thiserror::Error;

/// Media Gateway error type.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Network or HTTP failure reaching a vendor REST endpoint or a
    /// signaling endpoint, including non-zero vendor `code` envelopes.
    #[error("Transport error during {operation}: {message}")]
    Transport {
        operation: &'static str,
        message: String,
    },

    /// The vendor response did not have the expected shape.
    #[error("Parse error during {operation}: {message}")]
    Parse {
        operation: &'static str,
        message: String,
    },

    /// The vendor has no endpoint backing this capability.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Factory dispatch miss; carries the offending type tag.
    #[error("Unsupported media server type: {0}")]
    UnsupportedServerType(String),

    /// Peer session lifecycle misuse.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Offer/answer negotiation rejected or the answer was malformed.
    #[error("Signaling error: {0}")]
    Signaling(String),
}

impl MediaError {
    /// Build a `Transport` error for the named operation.
    pub fn transport(operation: &'static str, message: impl Into<String>) -> Self {
        MediaError::Transport {
            operation,
            message: message.into(),
        }
    }

    /// Build a `Parse` error for the named operation.
    pub fn parse(operation: &'static str, message: impl Into<String>) -> Self {
        MediaError::Parse {
            operation,
            message: message.into(),
        }
    }

    /// Name of the failing operation, for errors that carry one.
    #[must_use]
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            MediaError::Transport { operation, .. } | MediaError::Parse { operation, .. } => {
                Some(*operation)
            }
            _ => None,
        }
    }

    /// Short machine-readable kind, used as a structured log field.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            MediaError::Transport { .. } => "transport",
            MediaError::Parse { .. } => "parse",
            MediaError::UnsupportedOperation(_) => "unsupported_operation",
            MediaError::UnsupportedServerType(_) => "unsupported_server_type",
            MediaError::InvalidState(_) => "invalid_state",
            MediaError::Signaling(_) => "signaling",
        }
    }
}
