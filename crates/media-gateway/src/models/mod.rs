//! Data models for Media Gateway.
//!
//! These are the vendor-neutral records every adapter produces. They are
//! rebuilt from scratch on each query and carry no identity across calls.

use common::secret::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of media server backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerType {
    /// SRS (Simple Realtime Server).
    Srs,
    /// ZLMediaKit.
    Zlm,
    /// Operator-defined server without a built-in adapter.
    Custom,
}

impl ServerType {
    /// Parse a type tag, ignoring ASCII case.
    ///
    /// Returns `None` for tags that name no known server type.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "srs" => Some(ServerType::Srs),
            "zlm" => Some(ServerType::Zlm),
            "custom" => Some(ServerType::Custom),
            _ => None,
        }
    }

    /// Canonical lowercase tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ServerType::Srs => "srs",
            ServerType::Zlm => "zlm",
            ServerType::Custom => "custom",
        }
    }
}

impl fmt::Display for ServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection parameters for one media server instance.
///
/// The type tag is kept as the raw string the directory stored so the
/// factory can report exactly what it could not dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerDescriptor {
    /// Server type tag as stored (e.g. "SRS", "zlm").
    #[serde(rename = "type")]
    pub server_type: String,

    /// Host name or IP of the server's HTTP API.
    #[serde(alias = "ip")]
    pub host: String,

    /// Port of the server's HTTP API.
    pub port: u16,

    /// Shared API secret (ZLMediaKit), if any.
    #[serde(default)]
    pub secret: Option<SecretString>,
}

impl ServerDescriptor {
    /// Create a descriptor without a secret.
    pub fn new(server_type: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            server_type: server_type.into(),
            host: host.into(),
            port,
            secret: None,
        }
    }

    /// Attach a shared secret. Empty strings are treated as no secret.
    #[must_use]
    pub fn with_secret(mut self, secret: SecretString) -> Self {
        self.secret = if secret.expose_secret().is_empty() {
            None
        } else {
            Some(secret)
        };
        self
    }

    /// Base URL of the server's HTTP API.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Server version snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// Video track details of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoCodecInfo {
    /// Codec name as the vendor reports it (e.g. "H264", "CodecH264").
    pub codec: String,
    pub width: u32,
    pub height: u32,
    /// Frames per second; 0 when the vendor does not report it.
    pub fps: u32,
    /// Bitrate in kbps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
}

/// Audio track details of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioCodecInfo {
    /// Codec name as the vendor reports it (e.g. "AAC", "CodecAAC").
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u32,
    /// Bitrate in kbps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<u32>,
}

/// One live or recently-live stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub id: String,
    pub name: String,
    pub vhost: String,
    pub url: String,
    /// Consuming clients; the publisher is never counted.
    pub clients: u64,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoCodecInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioCodecInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub send_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recv_bytes: Option<u64>,
}

/// One consuming client. Publishers are never represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientInfo {
    pub id: String,
    pub vhost: String,
    pub stream: String,
    pub ip: String,
    pub url: String,
    /// Connection age in milliseconds.
    pub alive: u64,
    /// Connection type (e.g. "rtc-play", "RtspSession").
    #[serde(rename = "type")]
    pub connection_type: String,
}
