//! Mock media server for adapter integration tests.

use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A wiremock server addressed the way adapters expect: host plus port.
pub struct VendorMock {
    server: MockServer,
}

impl VendorMock {
    /// Start a mock server on a random local port.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Host (IP literal) the mock listens on.
    pub fn host(&self) -> String {
        self.server.address().ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.server.address().port()
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Underlying server, for custom matchers and request inspection.
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Answer `GET path` with `body` and HTTP 200.
    pub async fn mount_get(&self, route: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `POST path` with `body` and HTTP 200.
    pub async fn mount_post(&self, route: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer any request to `path` with a bare HTTP status.
    pub async fn mount_status(&self, route: &str, status: u16) {
        Mock::given(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }
}
