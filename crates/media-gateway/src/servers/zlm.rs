//! ZLMediaKit adapter.
//!
//! Talks to the ZLM HTTP API (`/index/api/...`). Every call carries the
//! shared secret as a query parameter when one is configured.

use super::http::{VendorClient, SECRET_PARAM};
use super::{AdapterOptions, MediaServer};
use crate::errors::MediaError;
use crate::locator::DEFAULT_VHOST;
use crate::models::{
    AudioCodecInfo, ClientInfo, ServerType, StreamInfo, VersionInfo, VideoCodecInfo,
};
use crate::signaling::SignalingDialect;
use async_trait::async_trait;
use common::secret::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, instrument};

const VERSION_PATH: &str = "/index/api/version";
const MEDIA_LIST_PATH: &str = "/index/api/getMediaList";
const PLAYER_LIST_PATH: &str = "/index/api/getMediaPlayerList";

/// Stream listings are restricted to one protocol so each stream appears once.
const LISTING_SCHEMA: &str = "rtsp";

const VIDEO_CODEC_TYPE: i64 = 0;
const AUDIO_CODEC_TYPE: i64 = 1;
const H264_CODEC_NAME: &str = "CodecH264";
const AAC_CODEC_NAME: &str = "CodecAAC";

/// Namespace prefix ZLM puts on session type names.
const TYPEID_PREFIX: &str = "mediakit::";

/// Reported as `ClientInfo::alive`: the player list carries no connection age.
pub const UNKNOWN_ALIVE_MS: u64 = 0;

#[derive(Debug, Deserialize)]
struct VersionResponse {
    data: ZlmVersion,
}

#[derive(Debug, Deserialize)]
struct ZlmVersion {
    #[serde(rename = "buildTime")]
    build_time: String,
}

#[derive(Debug, Deserialize)]
struct MediaListResponse {
    #[serde(default)]
    data: Vec<ZlmMedia>,
}

#[derive(Debug, Deserialize)]
struct ZlmMedia {
    app: String,
    stream: String,
    #[serde(default)]
    vhost: String,
    #[serde(rename = "aliveSecond", default)]
    alive_second: u64,
    #[serde(rename = "readerCount", default)]
    reader_count: u64,
    #[serde(rename = "originUrl", default)]
    origin_url: String,
    #[serde(default)]
    tracks: Vec<ZlmTrack>,
}

#[derive(Debug, Deserialize)]
struct ZlmTrack {
    codec_type: i64,
    #[serde(default)]
    codec_id_name: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    fps: f64,
    #[serde(default)]
    sample_rate: u32,
    #[serde(default)]
    channels: u32,
}

#[derive(Debug, Deserialize)]
struct PlayerListResponse {
    #[serde(default)]
    data: Vec<ZlmPlayer>,
}

#[derive(Debug, Deserialize)]
struct ZlmPlayer {
    identifier: String,
    #[serde(default)]
    peer_ip: String,
    #[serde(default)]
    typeid: String,
}

#[derive(Debug, Deserialize)]
struct MediaProbe {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

impl ZlmMedia {
    fn into_stream_info(self, host: &str) -> StreamInfo {
        let video = self
            .tracks
            .iter()
            .find(|t| t.codec_type == VIDEO_CODEC_TYPE && t.codec_id_name == H264_CODEC_NAME)
            .map(|t| VideoCodecInfo {
                codec: t.codec_id_name.clone(),
                width: t.width,
                height: t.height,
                fps: round_fps(t.fps),
                bitrate: None,
            });
        let audio = self
            .tracks
            .iter()
            .find(|t| t.codec_type == AUDIO_CODEC_TYPE && t.codec_id_name == AAC_CODEC_NAME)
            .map(|t| AudioCodecInfo {
                codec: t.codec_id_name.clone(),
                sample_rate: t.sample_rate,
                channels: t.channels,
                bitrate: None,
            });

        let url = if self.origin_url.is_empty() {
            format!("{LISTING_SCHEMA}://{host}/{}/{}", self.app, self.stream)
        } else {
            self.origin_url
        };
        let vhost = if self.vhost.is_empty() {
            DEFAULT_VHOST.to_string()
        } else {
            self.vhost
        };

        StreamInfo {
            id: self.stream.clone(),
            name: self.stream,
            vhost,
            url,
            clients: self.reader_count,
            active: self.alive_second > 0,
            video,
            audio,
            send_bytes: None,
            recv_bytes: None,
        }
    }
}

impl From<ZlmPlayer> for ClientInfo {
    fn from(player: ZlmPlayer) -> Self {
        let stream = player
            .identifier
            .split('-')
            .nth(1)
            .unwrap_or_default()
            .to_string();
        let connection_type = player
            .typeid
            .strip_prefix(TYPEID_PREFIX)
            .unwrap_or(&player.typeid)
            .to_string();

        ClientInfo {
            id: player.identifier,
            vhost: DEFAULT_VHOST.to_string(),
            stream,
            ip: player.peer_ip,
            url: String::new(),
            alive: UNKNOWN_ALIVE_MS,
            connection_type,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_fps(fps: f64) -> u32 {
    fps.round() as u32
}

/// Adapter for one ZLMediaKit instance.
#[derive(Debug, Clone)]
pub struct ZlmServer {
    client: VendorClient,
    host: String,
    port: u16,
    secret: Option<SecretString>,
}

impl ZlmServer {
    /// Create an adapter for the ZLM API at `host:port`.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the HTTP client cannot be built.
    pub fn new(
        host: &str,
        port: u16,
        secret: Option<SecretString>,
        options: &AdapterOptions,
    ) -> Result<Self, MediaError> {
        Ok(Self {
            client: VendorClient::new(format!("http://{host}:{port}"), options.timeout)?,
            host: host.to_string(),
            port,
            secret: secret.filter(|s| !s.expose_secret().is_empty()),
        })
    }

    /// Query pairs for a request, with the secret first when configured.
    fn params<'a>(&'a self, extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        let mut params = Vec::with_capacity(extra.len() + 1);
        if let Some(secret) = &self.secret {
            params.push((SECRET_PARAM, secret.expose_secret()));
        }
        params.extend_from_slice(extra);
        params
    }
}

#[async_trait]
impl MediaServer for ZlmServer {
    fn server_type(&self) -> ServerType {
        ServerType::Zlm
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_version(&self) -> Result<VersionInfo, MediaError> {
        const OP: &str = "get ZLM version";
        let url = self.client.url(OP, VERSION_PATH, &self.params(&[]))?;
        let response: VersionResponse = self.client.get_json(OP, url).await?;

        // ZLM has no semantic version; the build timestamp stands in.
        Ok(VersionInfo {
            version: response.data.build_time.clone(),
            build_date: Some(response.data.build_time),
            platform: None,
        })
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_stream_info(&self) -> Result<Vec<StreamInfo>, MediaError> {
        const OP: &str = "get ZLM streams";
        let url = self
            .client
            .url(OP, MEDIA_LIST_PATH, &self.params(&[("schema", LISTING_SCHEMA)]))?;
        let response: MediaListResponse = self.client.get_json(OP, url).await?;

        debug!(target: "mg.servers.zlm", count = response.data.len(), "Fetched streams");
        Ok(response
            .data
            .into_iter()
            .map(|media| media.into_stream_info(&self.host))
            .collect())
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn get_client_info(&self, stream: Option<&str>) -> Result<Vec<ClientInfo>, MediaError> {
        const OP: &str = "get ZLM clients";
        let url = self.client.url(OP, PLAYER_LIST_PATH, &self.params(&[]))?;
        let response: PlayerListResponse = self.client.get_json(OP, url).await?;

        let clients: Vec<ClientInfo> = response
            .data
            .into_iter()
            .map(ClientInfo::from)
            .filter(|c| stream.map_or(true, |s| c.stream == s))
            .collect();

        debug!(target: "mg.servers.zlm", count = clients.len(), "Fetched clients");
        Ok(clients)
    }

    async fn kick_client(&self, _client_id: &str) -> Result<(), MediaError> {
        Err(MediaError::UnsupportedOperation(
            "kick_client is not supported by ZLM".to_string(),
        ))
    }

    #[instrument(skip(self), fields(host = %self.host))]
    async fn stream_status(&self, stream: &str) -> Result<bool, MediaError> {
        const OP: &str = "get ZLM stream status";
        let url = self
            .client
            .url(OP, MEDIA_LIST_PATH, &self.params(&[("stream", stream)]))?;

        // A missing stream is reported through `code`, not as a failure.
        let probe: MediaProbe = self.client.get_unchecked(OP, url).await?;
        Ok(probe.code == 0 && probe.data.is_some_and(|d| !d.is_empty()))
    }

    fn play_url(&self, app: &str, stream: &str) -> String {
        format!(
            "http://{}:{}/index/api/webrtc?app={app}&stream={stream}&type=play",
            self.host, self.port
        )
    }

    fn signaling_dialect(&self) -> SignalingDialect {
        SignalingDialect::Zlm
    }

    fn http_client(&self) -> &reqwest::Client {
        self.client.http()
    }
}
