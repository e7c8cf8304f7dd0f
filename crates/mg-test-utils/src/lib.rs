//! # Media Gateway Test Utilities
//!
//! Shared test utilities for Media Gateway integration tests.
//!
//! This crate provides:
//! - Canned SRS and ZLMediaKit API bodies (`fixtures`)
//! - A mock vendor server exposing `host()`/`port()` for adapters
//!   (`VendorMock`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mg_test_utils::{fixtures, VendorMock};
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let mock = VendorMock::start().await;
//!     mock.mount_get("/api/v1/versions", fixtures::srs_versions()).await;
//!
//!     let server = SrsServer::new(&mock.host(), mock.port(), &AdapterOptions::default())?;
//!     assert_eq!(server.get_version().await?.version, "5.0.210");
//! }
//! ```

pub mod fixtures;
pub mod vendor_mock;

// Re-export commonly used items
pub use vendor_mock::*;
