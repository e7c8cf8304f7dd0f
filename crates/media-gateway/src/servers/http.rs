//! Vendor REST plumbing shared by the adapters.
//!
//! Both vendors wrap every response in a JSON envelope whose `code` field is
//! zero on success. A non-zero code is a failure even on HTTP 200.

use crate::errors::MediaError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

/// Upper bound on the TCP connect phase, whatever the request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Query parameter carrying the ZLM shared secret.
pub(crate) const SECRET_PARAM: &str = "secret";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default, alias = "message")]
    msg: Option<String>,
}

/// HTTP client bound to one server's REST base URL.
#[derive(Debug, Clone)]
pub(crate) struct VendorClient {
    http: Client,
    base_url: String,
}

impl VendorClient {
    /// # Errors
    ///
    /// Returns `MediaError::Transport` if the HTTP client cannot be built.
    pub(crate) fn new(base_url: String, timeout: Duration) -> Result<Self, MediaError> {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(|e| {
                error!(target: "mg.servers.http", error = %e, "Failed to build HTTP client");
                MediaError::transport("build HTTP client", e.to_string())
            })?;

        Ok(Self { http, base_url })
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Absolute URL for `path` with `params` appended in order.
    pub(crate) fn url(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Url, MediaError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| MediaError::transport(operation, format!("invalid server address: {e}")))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// GET `url`, check the envelope and decode the body as `T`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<T, MediaError> {
        let body = self.send(operation, self.http.get(url.clone()), &url).await?;
        decode_checked(operation, &body)
    }

    /// GET `url` and decode the body as `T` without interpreting `code`.
    pub(crate) async fn get_unchecked<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<T, MediaError> {
        let body = self.send(operation, self.http.get(url.clone()), &url).await?;
        serde_json::from_str(&body).map_err(|e| MediaError::parse(operation, e.to_string()))
    }

    /// POST to `url` with an empty body and check the envelope.
    pub(crate) async fn post_empty(
        &self,
        operation: &'static str,
        url: Url,
    ) -> Result<(), MediaError> {
        let body = self.send(operation, self.http.post(url.clone()), &url).await?;
        let _: Envelope = decode_checked(operation, &body)?;
        Ok(())
    }

    async fn send(
        &self,
        operation: &'static str,
        request: reqwest::RequestBuilder,
        url: &Url,
    ) -> Result<String, MediaError> {
        let loggable = redact(url);
        debug!(target: "mg.servers.http", operation, url = %loggable, "Vendor request");

        let response = request.send().await.map_err(|e| {
            warn!(target: "mg.servers.http", operation, url = %loggable, error = %e, "Vendor request failed");
            MediaError::transport(operation, without_url(&e))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(target: "mg.servers.http", operation, url = %loggable, status = %status, "Vendor returned error status");
            return Err(MediaError::transport(operation, format!("HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| MediaError::transport(operation, without_url(&e)))
    }
}

fn decode_checked<T: DeserializeOwned>(
    operation: &'static str,
    body: &str,
) -> Result<T, MediaError> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| MediaError::parse(operation, e.to_string()))?;
    if envelope.code != 0 {
        warn!(target: "mg.servers.http", operation, code = envelope.code, "Vendor reported failure");
        let detail = envelope.msg.unwrap_or_default();
        return Err(MediaError::transport(
            operation,
            format!("vendor code {} {detail}", envelope.code).trim_end().to_string(),
        ));
    }
    serde_json::from_str(body).map_err(|e| MediaError::parse(operation, e.to_string()))
}

/// Error text with any request URL stripped, since it may carry the secret.
fn without_url(e: &reqwest::Error) -> String {
    let mut text = e.to_string();
    if let Some(url) = e.url() {
        text = text.replace(url.as_str(), &redact(url));
    }
    text
}

/// Render `url` with the shared secret masked.
pub(crate) fn redact(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == SECRET_PARAM) {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == SECRET_PARAM {
                "[REDACTED]".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    let mut masked = url.clone();
    masked.query_pairs_mut().clear().extend_pairs(pairs);
    masked.to_string()
}
