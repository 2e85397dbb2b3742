//! Tests for the platform API client and request types.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::PlatformGateway;
use super::client::{PlatformClient, PlatformConfig, PlatformError};
use super::profile::{CODEC_SCRIPT, DeviceProfile, MEASUREMENT_KEYS};
use super::types::{DeviceActivation, DeviceInfo};

const DEV_EUI: &str = "C5EABC521E8304EE";

fn config_for(server: &MockServer, token: &str) -> PlatformConfig {
    let addr = server.address();
    PlatformConfig {
        scheme: "http".into(),
        host: addr.ip().to_string(),
        port: addr.port(),
        token: token.into(),
        enabled: true,
        timeout: Duration::from_secs(5),
    }
}

fn client_for(server: &MockServer) -> PlatformClient {
    PlatformClient::new(&config_for(server, "test-token")).unwrap()
}

// =============================================================================
// Configuration tests
// =============================================================================

#[test]
fn base_url_includes_scheme_host_port_and_api_prefix() {
    let config = PlatformConfig {
        scheme: "https".into(),
        host: "ns.example.com".into(),
        port: 8090,
        token: "t".into(),
        enabled: true,
        timeout: Duration::from_secs(30),
    };
    assert_eq!(config.base_url(), "https://ns.example.com:8090/api");
}

#[test]
fn enabled_requires_flag_and_token() {
    let mut config = PlatformConfig {
        scheme: "http".into(),
        host: "localhost".into(),
        port: 8090,
        token: "t".into(),
        enabled: true,
        timeout: Duration::from_secs(30),
    };
    assert!(config.is_enabled());

    config.token.clear();
    assert!(!config.is_enabled());

    config.token = "t".into();
    config.enabled = false;
    assert!(!config.is_enabled());
}

#[test]
fn empty_host_returns_config_error() {
    let config = PlatformConfig {
        scheme: "http".into(),
        host: String::new(),
        port: 8090,
        token: "t".into(),
        enabled: true,
        timeout: Duration::from_secs(30),
    };
    let err = PlatformClient::new(&config).unwrap_err();
    assert!(matches!(err, PlatformError::Config(_)));
}

#[test]
fn token_with_newline_returns_config_error() {
    let config = PlatformConfig {
        scheme: "http".into(),
        host: "localhost".into(),
        port: 8090,
        token: "bad\ntoken".into(),
        enabled: true,
        timeout: Duration::from_secs(30),
    };
    let err = PlatformClient::new(&config).unwrap_err();
    assert!(matches!(err, PlatformError::Config(_)));
}

// =============================================================================
// Request body tests
// =============================================================================

#[test]
fn activation_reuses_network_key_for_all_network_roles() {
    let activation = DeviceActivation::from_keys("NWK", "APP", "ADDR");
    let value = serde_json::to_value(&activation).unwrap();

    assert_eq!(value["fNwkSIntKey"], "NWK");
    assert_eq!(value["sNwkSIntKey"], "NWK");
    assert_eq!(value["nwkSEncKey"], "NWK");
    assert_eq!(value["appSKey"], "APP");
    assert_eq!(value["devAddr"], "ADDR");
    assert_eq!(value["fCntUp"], 0);
    assert_eq!(value["nFCntDown"], 0);
    assert_eq!(value["aFCntDown"], 0);
}

#[test]
fn abp_device_uses_zero_join_eui_and_skips_fcnt_check() {
    let device = DeviceInfo::abp("app-1", "dp-1", DEV_EUI, "tracker", "roof");
    let value = serde_json::to_value(&device).unwrap();

    assert_eq!(value["joinEui"], "0000000000000000");
    assert_eq!(value["skipFcntCheck"], true);
    assert_eq!(value["isDisabled"], false);
    assert_eq!(value["devEui"], DEV_EUI);
    assert_eq!(value["deviceProfileId"], "dp-1");
    assert_eq!(value["tags"], json!({}));
}

#[test]
fn rak_abp_profile_preset() {
    let value = serde_json::to_value(DeviceProfile::rak_abp("t-1")).unwrap();

    assert_eq!(value["tenantId"], "t-1");
    assert_eq!(value["name"], "RAK_ABP");
    assert_eq!(value["region"], "AS923_2");
    assert_eq!(value["macVersion"], "LORAWAN_1_0_3");
    assert_eq!(value["supportsOtaa"], false);
    assert_eq!(value["supportsClassC"], true);
    assert_eq!(value["abpRx2Freq"], 921_400_000);
    assert_eq!(value["classBPingSlotNbK"], 0);
    assert_eq!(value["relayEdActivationMode"], "DISABLE_RELAY_MODE");
    assert_eq!(
        value["measurements"].as_object().unwrap().len(),
        MEASUREMENT_KEYS.len()
    );
    assert_eq!(value["measurements"]["voltage"]["kind"], "UNKNOWN");
}

#[test]
fn codec_script_defines_decoder() {
    assert!(CODEC_SCRIPT.contains("function decodeUplink(input)"));
}

// =============================================================================
// HTTP tests
// =============================================================================

#[tokio::test]
async fn create_tenant_sends_bearer_and_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tenants"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_partial_json(json!({
            "tenant": { "name": "alice@example.com", "maxDeviceCount": 10000 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "t-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let id = client.create_tenant("alice@example.com").await.unwrap();
    assert_eq!(id, "t-1");
}

#[tokio::test]
async fn create_application_and_profile_post_to_their_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .and(body_partial_json(json!({
            "application": { "tenantId": "t-1", "name": "Lnode", "description": "Application for Lnode" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "app-1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/device-profiles"))
        .and(body_partial_json(json!({
            "deviceProfile": { "tenantId": "t-1", "name": "RAK_ABP" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "dp-1" })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.create_application("t-1", "Lnode").await.unwrap(), "app-1");
    assert_eq!(client.create_device_profile("t-1").await.unwrap(), "dp-1");
}

#[tokio::test]
async fn create_and_activate_device() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/devices"))
        .and(body_partial_json(json!({ "device": { "devEui": DEV_EUI } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/api/devices/{DEV_EUI}/activate")))
        .and(body_partial_json(json!({ "deviceActivation": { "devAddr": "260B1A2F" } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let device = DeviceInfo::abp("app-1", "dp-1", DEV_EUI, "tracker", "tracker");
    client.create_device(&device).await.unwrap();

    let activation = DeviceActivation::from_keys(
        "2B7E151628AED2A6ABF7158809CF4F3C",
        "3C4FCF098815F7ABA6D2AE2816157E2B",
        "260B1A2F",
    );
    client.activate_device(DEV_EUI, &activation).await.unwrap();
}

#[tokio::test]
async fn delete_device_uses_dev_eui_path() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/devices/{DEV_EUI}")))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_device(DEV_EUI).await.unwrap();
}

#[tokio::test]
async fn non_success_status_carries_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/tenants"))
        .respond_with(ResponseTemplate::new(409).set_body_string("object already exists"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.create_tenant("alice@example.com").await.unwrap_err();
    match err {
        PlatformError::Api { status, body } => {
            assert_eq!(status, 409);
            assert_eq!(body, "object already exists");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn response_without_id_is_a_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/applications"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.create_application("t-1", "Lnode").await.unwrap_err();
    assert!(matches!(err, PlatformError::Decode { status: 200, .. }));
}

#[tokio::test]
async fn disabled_client_makes_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = PlatformClient::new(&config_for(&server, "")).unwrap();
    assert!(!client.is_enabled());

    let err = client.create_tenant("alice@example.com").await.unwrap_err();
    assert!(matches!(err, PlatformError::Disabled));
    let err = client.delete_device(DEV_EUI).await.unwrap_err();
    assert!(matches!(err, PlatformError::Disabled));
}
