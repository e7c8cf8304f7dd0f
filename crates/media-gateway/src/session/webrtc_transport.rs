//! [`PeerTransport`] backed by a real `webrtc` peer connection.

use super::{InboundTrack, PeerTransport, TrackKind, TrackSink};
use crate::errors::MediaError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::api::APIBuilder;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_transceiver_direction::RTCRtpTransceiverDirection;
use webrtc::rtp_transceiver::RTCRtpTransceiverInit;

impl From<TrackKind> for RTPCodecType {
    fn from(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Audio => RTPCodecType::Audio,
            TrackKind::Video => RTPCodecType::Video,
        }
    }
}

/// Peer connection with default codecs and interceptors, no ICE servers.
pub struct WebRtcTransport {
    peer_connection: Arc<RTCPeerConnection>,
    sink: Arc<Mutex<Option<TrackSink>>>,
}

impl WebRtcTransport {
    /// Build a fresh peer connection.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the media engine or the peer
    /// connection cannot be set up.
    pub async fn new() -> Result<Self, MediaError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(|e| MediaError::transport("create peer connection", e.to_string()))?;

        let mut registry = Registry::new();
        registry = register_default_interceptors(registry, &mut media_engine)
            .map_err(|e| MediaError::transport("create peer connection", e.to_string()))?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let peer_connection = Arc::new(
            api.new_peer_connection(RTCConfiguration::default())
                .await
                .map_err(|e| MediaError::transport("create peer connection", e.to_string()))?,
        );

        peer_connection.on_peer_connection_state_change(Box::new(move |state| {
            Box::pin(async move {
                info!(target: "mg.session", state = %state, "Peer connection state changed");
            })
        }));

        let sink: Arc<Mutex<Option<TrackSink>>> = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&sink);
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let mime_type = track.codec().capability.mime_type.clone();
            let kind = if mime_type.to_lowercase().starts_with("video") {
                TrackKind::Video
            } else {
                TrackKind::Audio
            };
            let inbound = InboundTrack {
                kind,
                track_id: track.id(),
                stream_id: track.stream_id(),
                mime_type,
                remote: Some(track),
            };
            debug!(target: "mg.session", track_id = %inbound.track_id, mime_type = %inbound.mime_type, "Inbound track");

            let sink = slot.lock().clone();
            Box::pin(async move {
                if let Some(sink) = sink {
                    sink(inbound);
                }
            })
        }));

        Ok(Self {
            peer_connection,
            sink,
        })
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn add_recvonly_transceiver(&self, kind: TrackKind) -> Result<(), MediaError> {
        self.peer_connection
            .add_transceiver_from_kind(
                kind.into(),
                Some(RTCRtpTransceiverInit {
                    direction: RTCRtpTransceiverDirection::Recvonly,
                    send_encodings: vec![],
                }),
            )
            .await
            .map_err(|e| MediaError::transport("add transceiver", e.to_string()))?;
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, MediaError> {
        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .map_err(|e| MediaError::transport("create offer", e.to_string()))?;

        // Wait for ICE gathering so the offer carries every candidate;
        // neither signaling dialect supports trickle ICE.
        let mut gathering_complete = self.peer_connection.gathering_complete_promise().await;

        self.peer_connection
            .set_local_description(offer)
            .await
            .map_err(|e| MediaError::transport("create offer", e.to_string()))?;

        let _ = gathering_complete.recv().await;

        self.peer_connection
            .local_description()
            .await
            .map(|description| description.sdp)
            .ok_or_else(|| MediaError::transport("create offer", "no local description"))
    }

    async fn apply_answer(&self, sdp: &str) -> Result<(), MediaError> {
        let answer = RTCSessionDescription::answer(sdp.to_string())
            .map_err(|e| MediaError::Signaling(format!("invalid answer SDP: {e}")))?;
        self.peer_connection
            .set_remote_description(answer)
            .await
            .map_err(|e| MediaError::Signaling(format!("answer rejected: {e}")))
    }

    fn set_track_sink(&self, sink: TrackSink) {
        *self.sink.lock() = Some(sink);
    }

    async fn close(&self) -> Result<(), MediaError> {
        self.sink.lock().take();
        self.peer_connection
            .close()
            .await
            .map_err(|e| MediaError::transport("close peer connection", e.to_string()))
    }
}
