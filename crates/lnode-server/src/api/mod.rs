//! HTTP/JSON surface.
//!
//! `/health` sits at the root; everything else is nested under `/api/v1`.
//! All routes except register, login and health require a bearer token.

pub mod allowed;
pub mod auth;
pub mod devices;
pub mod users;
pub mod versions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use lnode_core::PageRequest;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{JwtManager, require_auth};
use crate::provisioning::Provisioner;
use crate::storage::Database;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub provisioner: Arc<Provisioner>,
}

/// `page` and `page_size` query parameters. Kept as strings so that junk
/// values fall back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.page_size.as_deref())
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route("/user/profile", get(auth::profile))
        .route("/users", get(users::list))
        .route("/users/search", get(users::search))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route(
            "/devices/versions",
            post(versions::create).get(versions::list),
        )
        .route(
            "/devices/versions/{id}",
            get(versions::get)
                .put(versions::update)
                .delete(versions::delete),
        )
        .route("/devices/allowed", post(allowed::create).get(allowed::list))
        .route(
            "/devices/allowed/{dev_eui}",
            get(allowed::get).put(allowed::update).delete(allowed::delete),
        )
        .route("/devices", post(devices::create))
        .route("/devices/my", get(devices::list_mine))
        .route("/devices/all", get(devices::list_all))
        .route(
            "/devices/{id}",
            get(devices::get).put(devices::update).delete(devices::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state.jwt),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", public.merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
