//! Factory integration tests.
//!
//! Builds adapters from stored server records and checks they reach the
//! right vendor API.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use media_gateway::config::Config;
use media_gateway::errors::MediaError;
use media_gateway::models::{ServerDescriptor, ServerType};
use media_gateway::servers::MediaServerFactory;
use mg_test_utils::{fixtures, VendorMock};
use std::collections::HashMap;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_uppercase_srs_record_reaches_srs_api() -> Result<()> {
    let mock = VendorMock::start().await;
    mock.mount_get("/api/v1/versions", fixtures::srs_versions())
        .await;

    let record = format!(
        r#"{{"type":"SRS","ip":"{}","port":{}}}"#,
        mock.host(),
        mock.port()
    );
    let descriptor: ServerDescriptor = serde_json::from_str(&record)?;
    let server = MediaServerFactory::create(descriptor)?;

    assert_eq!(server.server_type(), ServerType::Srs);
    assert_eq!(server.get_version().await?.version, "5.0.210");
    Ok(())
}

#[tokio::test]
async fn test_zlm_record_carries_secret_to_adapter() -> Result<()> {
    let mock = VendorMock::start().await;
    Mock::given(method("GET"))
        .and(path("/index/api/version"))
        .and(query_param("secret", "s3cr3t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::zlm_version()))
        .expect(1)
        .mount(mock.server())
        .await;

    let record = format!(
        r#"{{"type":"zlm","ip":"{}","port":{},"secret":"s3cr3t"}}"#,
        mock.host(),
        mock.port()
    );
    let descriptor: ServerDescriptor = serde_json::from_str(&record)?;
    let server = MediaServerFactory::create(descriptor)?;

    assert_eq!(server.server_type(), ServerType::Zlm);
    assert_eq!(server.get_version().await?.version, "2023-04-19T10:34:34");
    Ok(())
}

#[test]
fn test_unrecognized_tag_fails() {
    let result = MediaServerFactory::create(ServerDescriptor::new("wowza", "10.0.0.7", 8087));
    assert!(matches!(result, Err(MediaError::UnsupportedServerType(tag)) if tag == "wowza"));
}

#[test]
fn test_each_call_builds_a_new_adapter() {
    let descriptor = ServerDescriptor::new("srs", "10.0.0.5", 1985);
    let first = MediaServerFactory::create(descriptor.clone()).unwrap();
    let second = MediaServerFactory::create(descriptor).unwrap();

    let first_addr = std::ptr::addr_of!(*first).cast::<u8>();
    let second_addr = std::ptr::addr_of!(*second).cast::<u8>();
    assert_ne!(first_addr, second_addr);
}

#[tokio::test]
async fn test_adapter_from_environment_config() -> Result<()> {
    let mock = VendorMock::start().await;
    mock.mount_get("/index/api/getMediaPlayerList", fixtures::zlm_player_list())
        .await;

    let vars = HashMap::from([
        ("MEDIA_SERVER_TYPE".to_string(), "ZLM".to_string()),
        ("MEDIA_SERVER_HOST".to_string(), mock.host()),
        ("MEDIA_SERVER_PORT".to_string(), mock.port().to_string()),
        ("MEDIA_HTTP_TIMEOUT_SECONDS".to_string(), "2".to_string()),
    ]);
    let config = Config::from_vars(&vars)?;
    let server = MediaServerFactory::create_with(config.descriptor(), &config.adapter_options())?;

    let clients = server.get_client_info(None).await?;
    assert_eq!(clients.len(), 2);
    Ok(())
}
