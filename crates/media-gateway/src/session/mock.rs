//! Mock peer transport for tests.

use super::{InboundTrack, PeerTransport, TrackKind, TrackSink};
use crate::errors::MediaError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Offer SDP returned by [`MockPeerTransport::create_offer`].
pub const MOCK_OFFER_SDP: &str = "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\ns=-\r\nt=0 0\r\n";

/// Records every call and never touches the network.
#[derive(Default)]
pub struct MockPeerTransport {
    transceivers: Mutex<Vec<TrackKind>>,
    answers: Mutex<Vec<String>>,
    sink: Mutex<Option<TrackSink>>,
    close_count: AtomicUsize,
    reject_answers: bool,
}

impl MockPeerTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `apply_answer` fail the way an unparseable SDP would.
    #[must_use]
    pub fn rejecting_answers(mut self) -> Self {
        self.reject_answers = true;
        self
    }

    /// Kinds of transceivers added, in order.
    pub fn transceivers(&self) -> Vec<TrackKind> {
        self.transceivers.lock().clone()
    }

    /// Answers successfully applied, in order.
    pub fn applied_answers(&self) -> Vec<String> {
        self.answers.lock().clone()
    }

    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Push a track through the registered sink, as a remote peer would.
    pub fn emit_track(&self, track: InboundTrack) {
        let sink = self.sink.lock().clone();
        if let Some(sink) = sink {
            sink(track);
        }
    }

    /// Track with no underlying remote.
    #[must_use]
    pub fn synthetic_track(kind: TrackKind) -> InboundTrack {
        let mime_type = match kind {
            TrackKind::Audio => "audio/opus",
            TrackKind::Video => "video/H264",
        };
        InboundTrack {
            kind,
            track_id: format!("mock-{mime_type}"),
            stream_id: "mock-stream".to_string(),
            mime_type: mime_type.to_string(),
            remote: None,
        }
    }
}

#[async_trait]
impl PeerTransport for MockPeerTransport {
    async fn add_recvonly_transceiver(&self, kind: TrackKind) -> Result<(), MediaError> {
        self.transceivers.lock().push(kind);
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, MediaError> {
        Ok(MOCK_OFFER_SDP.to_string())
    }

    async fn apply_answer(&self, sdp: &str) -> Result<(), MediaError> {
        if self.reject_answers {
            return Err(MediaError::Signaling("invalid answer SDP".to_string()));
        }
        self.answers.lock().push(sdp.to_string());
        Ok(())
    }

    fn set_track_sink(&self, sink: TrackSink) {
        *self.sink.lock() = Some(sink);
    }

    async fn close(&self) -> Result<(), MediaError> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        self.sink.lock().take();
        Ok(())
    }
}
