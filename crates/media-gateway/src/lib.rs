//! Media Gateway Library
//!
//! Vendor-neutral control of streaming media servers and WebRTC playback
//! of their streams.
//!
//! # Architecture
//!
//! ```text
//! MediaServerFactory -> servers/{srs,zlm}.rs -> session (PeerSession)
//!                                                  -> signaling -> locator
//! ```
//!
//! # Modules
//!
//! - `config` - Configuration from environment
//! - `errors` - Error taxonomy shared by every component
//! - `locator` - Stream locator parsing
//! - `models` - Vendor-neutral data model
//! - `servers` - `MediaServer` contract, vendor adapters and factory
//! - `session` - Peer session state machine and transports
//! - `signaling` - Signaling endpoint derivation and offer/answer exchange

pub mod config;
pub mod errors;
pub mod locator;
pub mod models;
pub mod servers;
pub mod session;
pub mod signaling;

pub use errors::MediaError;
pub use servers::{AdapterOptions, MediaServer, MediaServerFactory};
pub use session::{PeerSession, SessionState};
