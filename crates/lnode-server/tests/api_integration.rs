//! End-to-end tests through the HTTP router with an in-memory store and a
//! platform double.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use lnode_server::api::{AppState, build_router};
use lnode_server::auth::JwtManager;
use lnode_server::platform::{DeviceActivation, DeviceInfo, PlatformError, PlatformGateway};
use lnode_server::provisioning::Provisioner;
use lnode_server::storage::Database;

const DEV_EUI: &str = "C5EABC521E8304EE";

/// Platform double that hands out fixed ids and remembers deletions.
#[derive(Default)]
struct FakePlatform {
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl PlatformGateway for FakePlatform {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn create_tenant(&self, _name: &str) -> Result<String, PlatformError> {
        Ok("tenant-1".into())
    }

    async fn create_application(
        &self,
        _tenant_id: &str,
        _name: &str,
    ) -> Result<String, PlatformError> {
        Ok("app-1".into())
    }

    async fn create_device_profile(&self, _tenant_id: &str) -> Result<String, PlatformError> {
        Ok("profile-1".into())
    }

    async fn create_device(&self, _device: &DeviceInfo) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn activate_device(
        &self,
        _dev_eui: &str,
        _activation: &DeviceActivation,
    ) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn delete_device(&self, dev_eui: &str) -> Result<(), PlatformError> {
        self.deleted.lock().unwrap().push(dev_eui.to_string());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    platform: Arc<FakePlatform>,
}

async fn test_app() -> TestApp {
    let db = Database::open_in_memory().await.unwrap();
    let jwt = Arc::new(JwtManager::new(b"integration-secret", 3600));
    let platform = Arc::new(FakePlatform::default());
    let provisioner = Arc::new(Provisioner::new(
        db.clone(),
        Arc::clone(&jwt),
        Arc::clone(&platform) as Arc<dyn PlatformGateway>,
    ));
    let router = build_router(AppState {
        db,
        jwt,
        provisioner,
    });
    TestApp { router, platform }
}

async fn send_json(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(router: &Router, email: &str) -> String {
    let (status, body) = send_json(
        router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "testpassword123",
            "full_name": "Test User",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let (status, body) = send_json(&app.router, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn register_returns_token_and_platform_identity() {
    let app = test_app().await;
    let (status, body) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "Alice@Example.com",
            "password": "testpassword123",
            "full_name": "Alice",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["tenant_id"], "tenant-1");
    assert!(body["user"].get("password_hash").is_none());
    assert_eq!(body["platform"]["status"], "success");
    assert_eq!(body["platform"]["application_id"], "app-1");
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app.router, "bob@example.com").await;

    let (status, body) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/auth/register",
        None,
        Some(json!({
            "email": "BOB@example.com",
            "password": "anotherpass",
            "full_name": "Bob Again",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[tokio::test]
async fn login_and_profile() {
    let app = test_app().await;
    register(&app.router, "carol@example.com").await;

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "carol@example.com", "password": "wrongpassword" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "email": "carol@example.com", "password": "testpassword123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, profile) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/user/profile",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["email"], "carol@example.com");
    assert_eq!(profile["user_id"], body["user"]["id"]);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = test_app().await;

    let (status, body) =
        send_json(&app.router, Method::GET, "/api/v1/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/devices/my",
        Some("not-a-token"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn pagination_past_the_end_is_empty() {
    let app = test_app().await;
    let token = register(&app.router, "dave@example.com").await;

    let (status, body) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/users?page=5&page_size=10",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 0);
    assert_eq!(body["total"], 1);
    assert_eq!(body["page"], 5);
    assert_eq!(body["total_pages"], 1);

    let (_, body) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/users?page=junk&page_size=0",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);
}

#[tokio::test]
async fn device_lifecycle() {
    let app = test_app().await;
    let token = register(&app.router, "erin@example.com").await;
    let token = Some(token.as_str());

    let (status, version) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices/versions",
        token,
        Some(json!({ "name": "RAK7200", "version": "v1.0" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let version_id = version["id"].as_str().unwrap().to_string();

    let (status, allowed) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices/allowed",
        token,
        Some(json!({
            "dev_eui": DEV_EUI.to_lowercase(),
            "nwk_key": "2B7E151628AED2A6ABF7158809CF4F3C",
            "app_key": "3C4FCF098815F7ABA6D2AE2816157E2B",
            "addr_key": "260B1A2F",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(allowed["dev_eui"], DEV_EUI);

    let (status, device) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices",
        token,
        Some(json!({
            "name": "Field sensor",
            "version_id": version_id,
            "dev_eui": DEV_EUI,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{device}");
    assert_eq!(device["chirpstack_device_created"], true);
    assert_eq!(device["chirpstack_device_activated"], true);
    assert_eq!(device["version"]["name"], "RAK7200");
    let device_id = device["id"].as_str().unwrap().to_string();

    let (status, mine) =
        send_json(&app.router, Method::GET, "/api/v1/devices/my", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let devices = mine["devices"].as_array().unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0]["id"], device_id.as_str());
    assert_eq!(mine["total"], 1);

    let (status, updated) = send_json(
        &app.router,
        Method::PUT,
        &format!("/api/v1/devices/{device_id}"),
        token,
        Some(json!({ "name": "Renamed sensor", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Renamed sensor");
    assert_eq!(updated["is_active"], false);

    let (status, body) = send_json(
        &app.router,
        Method::DELETE,
        &format!("/api/v1/devices/{device_id}"),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Device deleted successfully");
    assert_eq!(*app.platform.deleted.lock().unwrap(), vec![DEV_EUI.to_string()]);

    let (status, _) = send_json(
        &app.router,
        Method::GET,
        &format!("/api/v1/devices/{device_id}"),
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn device_outside_allow_list_is_rejected() {
    let app = test_app().await;
    let token = register(&app.router, "frank@example.com").await;

    let (_, version) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices/versions",
        Some(&token),
        Some(json!({ "name": "RAK7200", "version": "v1.0" })),
    )
    .await;

    let (status, body) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices",
        Some(&token),
        Some(json!({
            "name": "Stray",
            "version_id": version["id"],
            "dev_eui": DEV_EUI,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("allow-list"));

    let (_, all) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/devices/all",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(all["total"], 0);
}

#[tokio::test]
async fn catalog_and_allow_list_validation() {
    let app = test_app().await;
    let token = register(&app.router, "grace@example.com").await;

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices/versions",
        Some(&token),
        Some(json!({ "name": "", "version": "v1.0" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app.router,
        Method::POST,
        "/api/v1/devices/allowed",
        Some(&token),
        Some(json!({
            "dev_eui": DEV_EUI,
            "nwk_key": "short",
            "app_key": "3C4FCF098815F7ABA6D2AE2816157E2B",
            "addr_key": "260B1A2F",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(
        &app.router,
        Method::PUT,
        &format!("/api/v1/devices/allowed/{DEV_EUI}"),
        Some(&token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no fields to update");
}

#[tokio::test]
async fn user_update_and_delete() {
    let app = test_app().await;
    let token = register(&app.router, "heidi@example.com").await;
    register(&app.router, "ivan@example.com").await;

    let (_, profile) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/user/profile",
        Some(&token),
        None,
    )
    .await;
    let user_id = profile["user_id"].as_str().unwrap().to_string();

    let (status, _) = send_json(
        &app.router,
        Method::PUT,
        &format!("/api/v1/users/{user_id}"),
        Some(&token),
        Some(json!({ "email": "ivan@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = send_json(
        &app.router,
        Method::PUT,
        &format!("/api/v1/users/{user_id}"),
        Some(&token),
        Some(json!({ "full_name": "Heidi Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["full_name"], "Heidi Renamed");
    assert!(updated.get("tenant_id").is_none());

    let (_, found) = send_json(
        &app.router,
        Method::GET,
        "/api/v1/users/search?q=RENAMED",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(found["total"], 1);

    let (status, _) = send_json(
        &app.router,
        Method::DELETE,
        &format!("/api/v1/users/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(
        &app.router,
        Method::GET,
        &format!("/api/v1/users/{user_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
