//! Secret types for keeping media server credentials out of logs.
//!
//! Re-exports [`secrecy`] so every crate in the workspace holds vendor
//! secrets (for example the ZLMediaKit API `secret`) the same way.
//!
//! `SecretString` implements `Debug` with redaction, so a struct that derives
//! `Debug` and carries a secret field prints `[REDACTED]` instead of the value.
//! Reading the value requires an explicit `expose_secret()` call, which keeps
//! every place that puts a secret on the wire easy to find.
//!
//! # Example
//!
//! ```rust
//! use common::secret::SecretString;
//! use secrecy::ExposeSecret;
//!
//! #[derive(Debug)]
//! struct ServerCredentials {
//!     host: String,
//!     secret: SecretString,
//! }
//!
//! let creds = ServerCredentials {
//!     host: "10.0.0.5".to_string(),
//!     secret: SecretString::from("zlm-api-secret"),
//! };
//!
//! // The secret is redacted here
//! println!("{:?}", creds);
//!
//! // and only visible where it is explicitly exposed
//! let query = format!("secret={}", creds.secret.expose_secret());
//! # assert_eq!(query, "secret=zlm-api-secret");
//! ```

pub use secrecy::{ExposeSecret, SecretString};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SecretString::from("035c73f7-bb6b-4889-a715-d9eb2d1925cc");
        let debug_str = format!("{secret:?}");

        assert!(debug_str.contains("REDACTED"));
        assert!(!debug_str.contains("035c73f7"));
    }

    #[test]
    fn test_expose_secret_returns_inner_value() {
        let secret = SecretString::from("zlm-secret");
        assert_eq!(secret.expose_secret(), "zlm-secret");
    }

    #[test]
    fn test_deserialize_server_record() {
        #[allow(dead_code)]
        #[derive(Debug, Deserialize)]
        struct ServerRecord {
            ip: String,
            secret: SecretString,
        }

        let json = r#"{"ip": "192.168.1.20", "secret": "my-secret-value"}"#;
        let record: ServerRecord = serde_json::from_str(json).expect("deserialize");

        assert_eq!(record.secret.expose_secret(), "my-secret-value");

        let debug = format!("{record:?}");
        assert!(debug.contains("192.168.1.20"));
        assert!(!debug.contains("my-secret-value"));
    }

    #[test]
    fn test_clone_works() {
        let secret = SecretString::from("cloneable");
        let cloned = secret.clone();
        assert_eq!(cloned.expose_secret(), "cloneable");
    }
}
