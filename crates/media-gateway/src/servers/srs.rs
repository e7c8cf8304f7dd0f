//! SRS (Simple Realtime Server) adapter.
//!
//! Talks to the SRS HTTP API (`/api/v1/...`, usually on port 1985).
//! SRS counts the publisher among a stream's clients; [`SrsServer`] reports
//! only consumers.

use super::http::VendorClient;
use super::{AdapterOptions, MediaServer};
use crate::errors::MediaError;
use crate::models::{
    AudioCodecInfo, ClientInfo, ServerType, StreamInfo, VersionInfo, VideoCodecInfo,
};
use crate::signaling::SignalingDialect;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

const VERSIONS_PATH: &str = "/api/v1/versions";
const STREAMS_PATH: &str = "/api/v1/streams/";
const CLIENTS_PATH: &str = "/api/v1/clients/";
const STATUS_PATH: &str = "/api/v1/streams";

/// Page size used when probing a single stream's status.
const STATUS_PROBE_COUNT: &str = "99";

#[derive(Debug, Deserialize)]
struct VersionsResponse {
    #[serde(default)]
    server: String,
    data: VersionData,
}

#[derive(Debug, Deserialize)]
struct VersionData {
    version: String,
}

#[derive(Debug, Deserialize)]
struct StreamsResponse {
    #[serde(default)]
    streams: Vec<SrsStream>,
}

#[derive(Debug, Deserialize)]
struct SrsStream {
    id: String,
    name: String,
    vhost: String,
    #[serde(rename = "tcUrl", default)]
    tc_url: String,
    clients: u64,
    #[serde(default)]
    send_bytes: u64,
    #[serde(default)]
    recv_bytes: u64,
    publish: SrsPublish,
    #[serde(default)]
    video: Option<SrsVideo>,
    #[serde(default)]
    audio: Option<SrsAudio>,
}

#[derive(Debug, Deserialize)]
struct SrsPublish {
    active: bool,
}

#[derive(Debug, Deserialize)]
struct SrsVideo {
    codec: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

#[derive(Debug, Deserialize)]
struct SrsAudio {
    codec: String,
    #[serde(default)]
    sample_rate: u32,
    #[serde(default)]
    channel: u32,
}

#[derive(Debug, Deserialize)]
struct ClientsResponse {
    #[serde(default)]
    clients: Vec<SrsClient>,
}

#[derive(Debug, Deserialize)]
struct SrsClient {
    id: String,
    vhost: String,
    stream: String,
    ip: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "type")]
    connection_type: String,
    publish: bool,
    /// Seconds since connect.
    alive: f64,
}

impl From<SrsStream> for StreamInfo {
    fn from(stream: SrsStream) -> Self {
        StreamInfo {
            id: stream.id,
            name: stream.name,
            vhost: stream.vhost,
            url: stream.tc_url,
            clients: stream.clients.saturating_sub(1),
            active: stream.publish.active,
            video: stream.video.map(|v| VideoCodecInfo {
                codec: v.codec,
                width: v.width,
                height: v.height,
                fps: 0,
                bitrate: None,
            }),
            audio: stream.audio.map(|a| AudioCodecInfo {
                codec: a.codec,
                sample_rate: a.sample_rate,
                channels: a.channel,
                bitrate: None,
            }),
            send_bytes: Some(stream.send_bytes),
            recv_bytes: Some(stream.recv_bytes),
        }
    }
}

impl From<SrsClient> for ClientInfo {
    fn from(client: SrsClient) -> Self {
        ClientInfo {
            id: client.id,
            vhost: client.vhost,
            stream: client.stream,
            ip: client.ip,
            url: client.url,
            alive: seconds_to_millis(client.alive),
            connection_type: client.connection_type,
        }
    }
}

/// Convert fractional seconds to whole milliseconds, rounding to nearest.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn seconds_to_millis(seconds: f64) -> u64 {
    // Saturating cast: negatives and NaN become 0.
    (seconds * 1000.0).round() as u64
}

/// Adapter for one SRS instance.
#[derive(Debug, Clone)]
pub struct SrsServer {
    client: VendorClient,
    host: String,
    default_scheme: String,
}

impl SrsServer {
    /// Create an adapter for the SRS API at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the HTTP client cannot be built.
    pub fn new(host: &str, port: u16, options: &AdapterOptions) -> Result<Self, MediaError> {
        Ok(Self {
            client: VendorClient::new(format!("http://{host}:{port}"), options.timeout)?,
            host: host.to_string(),
            default_scheme: options.default_scheme.clone(),
        })
    }
}

#[async_trait]
impl MediaServer for SrsServer {
    fn server_type(&self) -> ServerType {
        ServerType::Srs
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_version(&self) -> Result<VersionInfo, MediaError> {
        const OP: &str = "get SRS version";
        let url = self.client.url(OP, VERSIONS_PATH, &[])?;
        let response: VersionsResponse = self.client.get_json(OP, url).await?;

        Ok(VersionInfo {
            version: response.data.version,
            build_date: None,
            platform: Some(format!("SRS Server: {}", response.server)),
        })
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_stream_info(&self) -> Result<Vec<StreamInfo>, MediaError> {
        const OP: &str = "get SRS streams";
        let url = self.client.url(OP, STREAMS_PATH, &[])?;
        let response: StreamsResponse = self.client.get_json(OP, url).await?;

        debug!(target: "mg.servers.srs", count = response.streams.len(), "Fetched streams");
        Ok(response.streams.into_iter().map(StreamInfo::from).collect())
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_client_info(&self, stream: Option<&str>) -> Result<Vec<ClientInfo>, MediaError> {
        const OP: &str = "get SRS clients";
        let url = self.client.url(OP, CLIENTS_PATH, &[])?;
        let response: ClientsResponse = self.client.get_json(OP, url).await?;

        let clients: Vec<ClientInfo> = response
            .clients
            .into_iter()
            .filter(|c| !c.publish)
            .filter(|c| stream.map_or(true, |s| c.stream == s))
            .map(ClientInfo::from)
            .collect();

        debug!(target: "mg.servers.srs", count = clients.len(), "Fetched clients");
        Ok(clients)
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn kick_client(&self, client_id: &str) -> Result<(), MediaError> {
        const OP: &str = "kick SRS client";
        let mut url = self.client.url(OP, CLIENTS_PATH, &[])?;
        url.path_segments_mut()
            .map_err(|()| MediaError::transport(OP, "server address cannot carry a path"))?
            .pop_if_empty()
            .push(client_id)
            .push("kick");

        self.client.post_empty(OP, url).await?;
        debug!(target: "mg.servers.srs", client_id = %client_id, "Client kicked");
        Ok(())
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn stream_status(&self, stream: &str) -> Result<bool, MediaError> {
        const OP: &str = "get SRS stream status";
        let url = self
            .client
            .url(OP, STATUS_PATH, &[("count", STATUS_PROBE_COUNT)])?;
        let response: StreamsResponse = self.client.get_json(OP, url).await?;

        Ok(response
            .streams
            .iter()
            .find(|s| s.name == stream)
            .is_some_and(|s| s.publish.active))
    }

    fn play_url(&self, app: &str, stream: &str) -> String {
        format!("webrtc://{}/{app}/{stream}", self.host)
    }

    fn signaling_dialect(&self) -> SignalingDialect {
        SignalingDialect::Srs {
            default_scheme: self.default_scheme.clone(),
        }
    }

    fn http_client(&self) -> &reqwest::Client {
        self.client.http()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_alive_seconds_round_to_millis() {
        assert_eq!(seconds_to_millis(12.345), 12345);
        assert_eq!(seconds_to_millis(0.0004), 0);
        assert_eq!(seconds_to_millis(0.9996), 1000);
        assert_eq!(seconds_to_millis(-1.0), 0);
    }

    #[test]
    fn test_publisher_is_not_counted() {
        let raw: SrsStream = serde_json::from_value(serde_json::json!({
            "id": "vid-9y0ozy0",
            "name": "0551954854",
            "vhost": "vid-v2ws53u",
            "tcUrl": "webrtc://127.0.0.1:1985/live",
            "clients": 3,
            "publish": {"active": true, "cid": "b3op069g"},
            "video": null,
            "audio": null
        }))
        .unwrap();

        let info = StreamInfo::from(raw);
        assert_eq!(info.clients, 2);
        assert!(info.active);
        assert!(info.video.is_none());
        assert!(info.audio.is_none());
        assert_eq!(info.url, "webrtc://127.0.0.1:1985/live");
    }

    #[test]
    fn test_zero_clients_does_not_underflow() {
        let raw: SrsStream = serde_json::from_value(serde_json::json!({
            "id": "s", "name": "n", "vhost": "v", "clients": 0,
            "publish": {"active": false}
        }))
        .unwrap();
        assert_eq!(StreamInfo::from(raw).clients, 0);
    }

    #[test]
    fn test_codec_records_default_fps_to_zero() {
        let raw: SrsStream = serde_json::from_value(serde_json::json!({
            "id": "s", "name": "n", "vhost": "v", "clients": 1,
            "publish": {"active": true},
            "video": {"codec": "H264", "profile": "High", "level": "3.1", "width": 1920, "height": 1080},
            "audio": {"codec": "AAC", "sample_rate": 44100, "channel": 2, "profile": "LC"}
        }))
        .unwrap();

        let info = StreamInfo::from(raw);
        assert_eq!(
            info.video,
            Some(VideoCodecInfo {
                codec: "H264".to_string(),
                width: 1920,
                height: 1080,
                fps: 0,
                bitrate: None,
            })
        );
        let audio = info.audio.unwrap();
        assert_eq!(audio.sample_rate, 44100);
        assert_eq!(audio.channels, 2);
    }

    #[test]
    fn test_play_url() {
        let server = SrsServer::new("10.0.0.5", 1985, &AdapterOptions::default()).unwrap();
        assert_eq!(server.play_url("live", "cam1"), "webrtc://10.0.0.5/live/cam1");
        assert_eq!(server.server_type(), ServerType::Srs);
    }

    #[test]
    fn test_signaling_dialect_carries_default_scheme() {
        let options = AdapterOptions {
            default_scheme: "https".to_string(),
            ..AdapterOptions::default()
        };
        let server = SrsServer::new("10.0.0.5", 1985, &options).unwrap();
        assert_eq!(
            server.signaling_dialect(),
            SignalingDialect::Srs {
                default_scheme: "https".to_string()
            }
        );
    }
}
