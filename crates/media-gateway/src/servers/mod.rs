//! Media server adapters.
//!
//! Every vendor adapter implements [`MediaServer`], so callers can list
//! streams, list clients and start playback without knowing which backend
//! they are talking to. [`MediaServerFactory`] picks the adapter from a
//! [`ServerDescriptor`](crate::models::ServerDescriptor).

pub mod factory;
pub(crate) mod http;
pub mod srs;
pub mod zlm;

use crate::errors::MediaError;
use crate::models::{ClientInfo, ServerType, StreamInfo, VersionInfo};
use crate::session::{PeerSession, PeerTransport, WebRtcTransport};
use crate::signaling::SignalingDialect;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub use factory::MediaServerFactory;
pub use srs::SrsServer;
pub use zlm::ZlmServer;

/// Default timeout for vendor REST and signaling requests in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Construction-time settings shared by all adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOptions {
    /// Timeout applied to every vendor REST and signaling request.
    pub timeout: Duration,
    /// Signaling transport used when a locator carries no `schema` override.
    pub default_scheme: String,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            default_scheme: "http".to_string(),
        }
    }
}

/// Capabilities every media server adapter provides.
///
/// List calls are fail-fast: a single malformed element fails the whole call
/// with `MediaError::Parse` rather than returning a partial list.
#[async_trait]
pub trait MediaServer: Send + Sync {
    /// Backend kind of this adapter.
    fn server_type(&self) -> ServerType;

    /// Query the server's version.
    async fn get_version(&self) -> Result<VersionInfo, MediaError>;

    /// List live streams.
    async fn get_stream_info(&self) -> Result<Vec<StreamInfo>, MediaError>;

    /// List consuming clients, optionally only those of `stream`.
    async fn get_client_info(&self, stream: Option<&str>) -> Result<Vec<ClientInfo>, MediaError>;

    /// Disconnect one client.
    async fn kick_client(&self, client_id: &str) -> Result<(), MediaError>;

    /// Whether `stream` is currently being published.
    async fn stream_status(&self, stream: &str) -> Result<bool, MediaError>;

    /// WebRTC play locator for `app`/`stream` on this server.
    fn play_url(&self, app: &str, stream: &str) -> String;

    /// Signaling dialect this vendor speaks.
    fn signaling_dialect(&self) -> SignalingDialect;

    /// HTTP client used for signaling.
    fn http_client(&self) -> &reqwest::Client;

    /// Build an idle session over a caller-supplied transport.
    fn peer_session_with(&self, transport: Arc<dyn PeerTransport>) -> PeerSession {
        PeerSession::new(
            self.signaling_dialect(),
            self.http_client().clone(),
            transport,
        )
    }

    /// Build an idle session over a fresh WebRTC peer connection.
    async fn create_peer_session(&self) -> Result<PeerSession, MediaError> {
        let transport = WebRtcTransport::new().await?;
        Ok(self.peer_session_with(Arc::new(transport)))
    }
}
