//! SRS adapter integration tests.
//!
//! Drives `SrsServer` against a mocked SRS HTTP API.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use media_gateway::errors::MediaError;
use media_gateway::models::ServerType;
use media_gateway::servers::{AdapterOptions, MediaServer, SrsServer};
use mg_test_utils::{fixtures, VendorMock};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn adapter(mock: &VendorMock) -> SrsServer {
    SrsServer::new(&mock.host(), mock.port(), &AdapterOptions::default()).unwrap()
}

#[tokio::test]
async fn test_get_version() -> Result<()> {
    let mock = VendorMock::start().await;
    mock.mount_get("/api/v1/versions", fixtures::srs_versions())
        .await;

    let version = adapter(&mock).get_version().await?;

    assert_eq!(version.version, "5.0.210");
    assert_eq!(version.build_date, None);
    assert_eq!(version.platform.as_deref(), Some("SRS Server: vid-y19n6nm"));
    Ok(())
}

#[tokio::test]
async fn test_get_stream_info_excludes_publisher_from_count() -> Result<()> {
    let mock = VendorMock::start().await;
    mock.mount_get("/api/v1/streams/", fixtures::srs_streams())
        .await;

    let streams = adapter(&mock).get_stream_info().await?;

    assert_eq!(streams.len(), 2);
    let cam1 = streams.iter().find(|s| s.name == "cam1").unwrap();
    assert_eq!(cam1.clients, 2);
    assert!(cam1.active);
    assert_eq!(cam1.url, "webrtc://10.0.0.5:1985/live");
    assert_eq!(cam1.send_bytes, Some(66_463_941));

    let video = cam1.video.as_ref().unwrap();
    assert_eq!(
        (video.codec.as_str(), video.width, video.height, video.fps),
        ("H264", 1280, 720, 0)
    );
    let audio = cam1.audio.as_ref().unwrap();
    assert_eq!(
        (audio.codec.as_str(), audio.sample_rate, audio.channels),
        ("AAC", 44100, 2)
    );

    let cam2 = streams.iter().find(|s| s.name == "cam2").unwrap();
    assert_eq!(cam2.clients, 0);
    assert!(!cam2.active);
    assert!(cam2.video.is_none());
    assert!(cam2.audio.is_none());
    Ok(())
}

#[tokio::test]
async fn test_get_client_info_excludes_publishers() -> Result<()> {
    let mock = VendorMock::start().await;
    mock.mount_get("/api/v1/clients/", fixtures::srs_clients())
        .await;

    let clients = adapter(&mock).get_client_info(None).await?;

    assert_eq!(clients.len(), 3);
    assert!(clients.iter().all(|c| c.id != "pub-1"));

    let rtc = clients.iter().find(|c| c.id == "play-1").unwrap();
    assert_eq!(rtc.alive, 12345);
    assert_eq!(rtc.connection_type, "rtc-play");
    assert_eq!(rtc.ip, "10.0.0.9");
    assert_eq!(rtc.url, "/live/cam1");
    Ok(())
}

#[tokio::test]
async fn test_get_client_info_filters_by_stream() -> Result<()> {
    let mock = VendorMock::start().await;
    mock.mount_get("/api/v1/clients/", fixtures::srs_clients())
        .await;
    let server = adapter(&mock);

    let cam1 = server.get_client_info(Some("cam1")).await?;
    let ids: Vec<_> = cam1.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["play-1", "play-2"]);

    let none = server.get_client_info(Some("cam9")).await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_malformed_stream_fails_whole_listing() {
    let mock = VendorMock::start().await;
    let mut body = fixtures::srs_streams();
    body["streams"][1]["publish"] = serde_json::json!("not-an-object");
    mock.mount_get("/api/v1/streams/", body).await;

    let err = adapter(&mock).get_stream_info().await.unwrap_err();

    assert!(matches!(err, MediaError::Parse { .. }));
    assert_eq!(err.operation(), Some("get SRS streams"));
}

#[tokio::test]
async fn test_non_zero_code_names_operation() {
    let mock = VendorMock::start().await;
    mock.mount_get("/api/v1/clients/", fixtures::vendor_error(1003, "system error"))
        .await;

    let err = adapter(&mock).get_client_info(None).await.unwrap_err();

    assert!(matches!(err, MediaError::Transport { .. }));
    assert_eq!(err.operation(), Some("get SRS clients"));
}

#[tokio::test]
async fn test_http_error_is_transport_error() {
    let mock = VendorMock::start().await;
    mock.mount_status("/api/v1/versions", 500).await;

    let err = adapter(&mock).get_version().await.unwrap_err();

    assert!(matches!(err, MediaError::Transport { .. }));
    assert_eq!(err.operation(), Some("get SRS version"));
}

#[tokio::test]
async fn test_kick_client_posts_to_kick_endpoint() -> Result<()> {
    let mock = VendorMock::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/clients/play-1/kick"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"code": 0})))
        .expect(1)
        .mount(mock.server())
        .await;

    adapter(&mock).kick_client("play-1").await?;
    Ok(())
}

#[tokio::test]
async fn test_kick_unknown_client_fails() {
    let mock = VendorMock::start().await;
    mock.mount_post("/api/v1/clients/ghost/kick", fixtures::vendor_error(2049, "client not found"))
        .await;

    let err = adapter(&mock).kick_client("ghost").await.unwrap_err();

    assert_eq!(err.operation(), Some("kick SRS client"));
}

#[tokio::test]
async fn test_stream_status() -> Result<()> {
    let mock = VendorMock::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/streams"))
        .and(query_param("count", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::srs_streams()))
        .mount(mock.server())
        .await;
    let server = adapter(&mock);

    assert!(server.stream_status("cam1").await?);
    assert!(!server.stream_status("cam2").await?);
    assert!(!server.stream_status("missing").await?);
    Ok(())
}

#[tokio::test]
async fn test_contract_metadata() {
    let mock = VendorMock::start().await;
    let server = adapter(&mock);

    assert_eq!(server.server_type(), ServerType::Srs);
    assert_eq!(
        server.play_url("live", "cam1"),
        format!("webrtc://{}/live/cam1", mock.host())
    );
}
