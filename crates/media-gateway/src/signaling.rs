//! Offer/answer signaling for WebRTC playback.
//!
//! Two vendor dialects exist:
//!
//! - **SRS**: the signaling endpoint is derived from the stream locator by
//!   [`resolve`], and the offer travels inside a JSON body
//!   `{api, streamurl, clientip, sdp}`.
//! - **ZLM**: the stream locator *is* the signaling endpoint, and the offer is
//!   posted as a raw `text/plain` body.
//!
//! Both answer with JSON `{code, sdp}`; a non-zero `code` is a rejection.

use crate::errors::MediaError;
use crate::locator::{self, CanonicalLocator};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Signaling path used when the locator carries no `play` override.
pub const DEFAULT_PLAY_PATH: &str = "/rtc/v1/play/";

/// Signaling port for plain HTTP when the locator has none.
pub const DEFAULT_HTTP_SIGNALING_PORT: u16 = 1985;

/// Signaling port for HTTPS when the locator has none.
pub const DEFAULT_HTTPS_SIGNALING_PORT: u16 = 443;

/// Query parameters that steer endpoint derivation and are not forwarded.
const RESERVED_PARAMS: [&str; 2] = ["api", "play"];

/// Concrete signaling address for one playback attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalingEndpoint {
    /// URL the offer is posted to.
    pub url: String,
    /// Original stream locator, echoed to the server.
    pub stream_url: String,
}

/// Derive the SRS signaling endpoint for a parsed locator.
///
/// `default_scheme` stands in for the transport the caller itself runs on
/// (`http` or `https`, with or without the trailing colon). Pure and
/// idempotent.
#[must_use]
pub fn resolve(locator: &CanonicalLocator, default_scheme: &str) -> SignalingEndpoint {
    let schema = match locator.query.get_non_empty("schema") {
        Some(schema) => format!("{schema}:"),
        None => format!("{}:", default_scheme.trim_end_matches(':')),
    };

    let port = if schema == "https:" {
        locator.port.unwrap_or(DEFAULT_HTTPS_SIGNALING_PORT)
    } else {
        locator.port.unwrap_or(DEFAULT_HTTP_SIGNALING_PORT)
    };

    let mut api = locator
        .query
        .get_non_empty("play")
        .unwrap_or(DEFAULT_PLAY_PATH)
        .to_string();
    if !api.ends_with('/') {
        api.push('/');
    }

    let mut url = format!("{schema}//{}:{port}{api}", locator.server);
    for (key, value) in locator.query.iter() {
        if !RESERVED_PARAMS.contains(&key) {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
    }
    let url = url.replacen(&format!("{api}&"), &format!("{api}?"), 1);

    SignalingEndpoint {
        url,
        stream_url: locator.url.clone(),
    }
}

/// Vendor convention for locating the signaling endpoint and framing the offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalingDialect {
    /// Endpoint derived by [`resolve`]; JSON offer body.
    Srs {
        /// Transport used when the locator has no `schema` override.
        default_scheme: String,
    },
    /// Endpoint equals the locator; raw SDP offer body.
    Zlm,
}

impl SignalingDialect {
    /// Signaling endpoint for a stream locator under this dialect.
    #[must_use]
    pub fn endpoint(&self, stream_locator: &str) -> SignalingEndpoint {
        match self {
            SignalingDialect::Srs { default_scheme } => {
                resolve(&locator::parse(stream_locator), default_scheme)
            }
            SignalingDialect::Zlm => SignalingEndpoint {
                url: stream_locator.to_string(),
                stream_url: stream_locator.to_string(),
            },
        }
    }

    /// Post `offer_sdp` to the signaling endpoint and return the answer SDP.
    ///
    /// # Errors
    ///
    /// `MediaError::Signaling` if the request fails, the server answers with
    /// a non-success HTTP status or a non-zero `code`, or the body carries no
    /// answer SDP.
    #[instrument(skip(self, http, offer_sdp), fields(dialect = self.name()))]
    pub async fn exchange(
        &self,
        http: &reqwest::Client,
        stream_locator: &str,
        offer_sdp: &str,
    ) -> Result<String, MediaError> {
        let endpoint = self.endpoint(stream_locator);
        debug!(target: "mg.signaling", url = %endpoint.url, "Posting offer");

        let request = match self {
            SignalingDialect::Srs { .. } => http.post(&endpoint.url).json(&SrsPlayRequest {
                api: &endpoint.url,
                streamurl: &endpoint.stream_url,
                clientip: None,
                sdp: offer_sdp,
            }),
            SignalingDialect::Zlm => http
                .post(&endpoint.url)
                .header(reqwest::header::CONTENT_TYPE, "text/plain;charset=utf-8")
                .body(offer_sdp.to_string()),
        };

        let response = request.send().await.map_err(|e| {
            warn!(target: "mg.signaling", error = %e, url = %endpoint.url, "Signaling request failed");
            MediaError::Signaling(format!("request to {} failed: {e}", endpoint.url))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(target: "mg.signaling", status = %status, body = %body, "Signaling endpoint returned error status");
            return Err(MediaError::Signaling(format!(
                "signaling endpoint returned HTTP {status}"
            )));
        }

        let answer: SignalingAnswer = response.json().await.map_err(|e| {
            MediaError::Signaling(format!("answer is not a valid signaling response: {e}"))
        })?;

        if answer.code != 0 {
            warn!(target: "mg.signaling", code = answer.code, "Signaling rejected by server");
            return Err(MediaError::Signaling(format!(
                "server rejected offer with code {}",
                answer.code
            )));
        }

        match answer.sdp {
            Some(sdp) if !sdp.trim().is_empty() => Ok(sdp),
            _ => Err(MediaError::Signaling(
                "signaling response carried no answer SDP".to_string(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SignalingDialect::Srs { .. } => "srs",
            SignalingDialect::Zlm => "zlm",
        }
    }
}

#[derive(Debug, Serialize)]
struct SrsPlayRequest<'a> {
    api: &'a str,
    streamurl: &'a str,
    clientip: Option<&'a str>,
    sdp: &'a str,
}

#[derive(Debug, Deserialize)]
struct SignalingAnswer {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    sdp: Option<String>,
}
