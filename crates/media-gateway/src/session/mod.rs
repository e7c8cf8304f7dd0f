//! Peer session controller for WebRTC playback.
//!
//! A [`PeerSession`] owns exactly one peer connection (behind the
//! [`PeerTransport`] seam) and walks a one-way lifecycle:
//!
//! ```text
//! Idle -> Negotiating -> Live -> Closed
//!   \________\______________\____^
//! ```
//!
//! `play` is accepted only from `Idle`. A failed negotiation closes the
//! session, since states never move backwards; callers that want to retry
//! create a new session. `close` is accepted from any state, is idempotent,
//! and may race an in-flight `play`: the peer connection is released either
//! way and the racing `play` reports `InvalidState`.

pub mod mock;
pub mod webrtc_transport;

use crate::errors::MediaError;
use crate::signaling::SignalingDialect;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use webrtc::track::track_remote::TrackRemote;

pub use self::webrtc_transport::WebRtcTransport;

/// Lifecycle state of a [`PeerSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Negotiating,
    Live,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Negotiating => "negotiating",
            SessionState::Live => "live",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Media kind of a transceiver or inbound track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

/// Inbound media track surfaced to the session's observer.
#[derive(Clone)]
pub struct InboundTrack {
    pub kind: TrackKind,
    pub track_id: String,
    pub stream_id: String,
    /// Negotiated codec MIME type (e.g. "video/H264").
    pub mime_type: String,
    /// Underlying remote track; `None` for synthetic tracks.
    pub remote: Option<Arc<TrackRemote>>,
}

impl fmt::Debug for InboundTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundTrack")
            .field("kind", &self.kind)
            .field("track_id", &self.track_id)
            .field("stream_id", &self.stream_id)
            .field("mime_type", &self.mime_type)
            .field("remote", &self.remote.is_some())
            .finish()
    }
}

/// Callback receiving inbound tracks, installed on transports and as the
/// session's track observer.
pub type TrackSink = Arc<dyn Fn(InboundTrack) + Send + Sync>;

/// The peer connection operations a session needs (enables mocking).
#[async_trait]
pub trait PeerTransport: Send + Sync {
    /// Add one receive-only transceiver of the given kind.
    async fn add_recvonly_transceiver(&self, kind: TrackKind) -> Result<(), MediaError>;

    /// Generate the local offer, apply it as the local description and
    /// return its SDP.
    async fn create_offer(&self) -> Result<String, MediaError>;

    /// Apply an answer SDP as the remote description.
    async fn apply_answer(&self, sdp: &str) -> Result<(), MediaError>;

    /// Route inbound tracks to `sink`.
    fn set_track_sink(&self, sink: TrackSink);

    /// Release the peer connection.
    async fn close(&self) -> Result<(), MediaError>;
}

/// Result of a successful `play`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionHandle {
    /// Endpoint the offer was posted to.
    pub signaling_url: String,
    /// Stream locator that was played.
    pub stream_url: String,
    /// Answer SDP applied as the remote description.
    pub answer_sdp: String,
}

/// One receive-only playback session.
pub struct PeerSession {
    dialect: SignalingDialect,
    http: reqwest::Client,
    transport: Arc<dyn PeerTransport>,
    state: Mutex<SessionState>,
    observer: Arc<Mutex<Option<TrackSink>>>,
}

impl PeerSession {
    /// Create an idle session over `transport`.
    ///
    /// The session wires the transport's track events to its observer slot;
    /// events raised while no observer is registered are dropped.
    pub fn new(
        dialect: SignalingDialect,
        http: reqwest::Client,
        transport: Arc<dyn PeerTransport>,
    ) -> Self {
        let observer: Arc<Mutex<Option<TrackSink>>> = Arc::new(Mutex::new(None));

        let slot = Arc::clone(&observer);
        transport.set_track_sink(Arc::new(move |track: InboundTrack| {
            let current = slot.lock().clone();
            match current {
                Some(observer) => observer(track),
                None => {
                    debug!(target: "mg.session", track_id = %track.track_id, "Track arrived with no observer, dropping");
                }
            }
        }));

        Self {
            dialect,
            http,
            transport,
            state: Mutex::new(SessionState::Idle),
            observer,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Register the track-arrival observer, replacing any previous one.
    pub fn on_track<F>(&self, observer: F)
    where
        F: Fn(InboundTrack) + Send + Sync + 'static,
    {
        *self.observer.lock() = Some(Arc::new(observer));
    }

    /// Remove the track-arrival observer.
    pub fn clear_on_track(&self) {
        self.observer.lock().take();
    }

    /// Negotiate receive-only playback of `stream_locator`.
    ///
    /// # Errors
    ///
    /// - `MediaError::InvalidState` if the session is not idle, or was closed
    ///   while negotiating
    /// - `MediaError::Signaling` if the offer/answer exchange fails
    /// - any transport error raised while preparing the offer
    ///
    /// Every error other than the initial state check leaves the session
    /// `Closed` with its peer connection released.
    #[instrument(skip(self), fields(dialect = ?self.dialect))]
    pub async fn play(&self, stream_locator: &str) -> Result<SessionHandle, MediaError> {
        if !self.transition(SessionState::Idle, SessionState::Negotiating) {
            return Err(MediaError::InvalidState(format!(
                "play requires an idle session, current state is {}",
                self.state()
            )));
        }

        match self.negotiate(stream_locator).await {
            Ok(handle) => {
                if !self.transition(SessionState::Negotiating, SessionState::Live) {
                    return Err(MediaError::InvalidState(
                        "session was closed during negotiation".to_string(),
                    ));
                }
                info!(target: "mg.session", signaling_url = %handle.signaling_url, "Session live");
                Ok(handle)
            }
            Err(e) => {
                warn!(target: "mg.session", error = %e, error_kind = e.kind(), "Negotiation failed, closing session");
                self.close().await;
                Err(e)
            }
        }
    }

    /// Move `from` -> `to` atomically; false if the session is not in `from`.
    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        let mut state = self.state.lock();
        if *state != from {
            return false;
        }
        *state = to;
        true
    }

    async fn negotiate(&self, stream_locator: &str) -> Result<SessionHandle, MediaError> {
        self.transport
            .add_recvonly_transceiver(TrackKind::Audio)
            .await?;
        self.transport
            .add_recvonly_transceiver(TrackKind::Video)
            .await?;

        let offer = self.transport.create_offer().await?;
        debug!(target: "mg.session", offer_len = offer.len(), "Local offer ready");

        let endpoint = self.dialect.endpoint(stream_locator);
        let answer = self
            .dialect
            .exchange(&self.http, stream_locator, &offer)
            .await?;

        if self.state() != SessionState::Negotiating {
            return Err(MediaError::InvalidState(
                "session was closed during negotiation".to_string(),
            ));
        }

        self.transport.apply_answer(&answer).await?;

        Ok(SessionHandle {
            signaling_url: endpoint.url,
            stream_url: endpoint.stream_url,
            answer_sdp: answer,
        })
    }

    /// Close the session and release the peer connection.
    ///
    /// Safe from any state and idempotent: calls after the first are no-ops.
    pub async fn close(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), SessionState::Closed);
        if previous == SessionState::Closed {
            return;
        }

        self.observer.lock().take();

        if let Err(e) = self.transport.close().await {
            warn!(target: "mg.session", error = %e, "Error closing peer connection");
        }
        info!(target: "mg.session", previous_state = %previous, "Session closed");
    }
}

impl Drop for PeerSession {
    fn drop(&mut self) {
        if *self.state.get_mut() == SessionState::Closed {
            return;
        }
        // Release the connection even when the owner never called close().
        let transport = Arc::clone(&self.transport);
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Err(e) = transport.close().await {
                    warn!(target: "mg.session", error = %e, "Error closing dropped peer connection");
                }
            });
        } else {
            warn!(target: "mg.session", "Session dropped outside a runtime without close()");
        }
    }
}
