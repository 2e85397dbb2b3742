//! Credential allow-list endpoints. Entries are keyed by `DevEUI`, which is
//! stored uppercase.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use lnode_core::validate::{self, DEV_ADDR_LEN, SESSION_KEY_LEN};
use lnode_core::PageMeta;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AppState, MessageResponse, PageQuery};
use crate::error::{AppError, AppResult};
use crate::storage::{AllowedDevice, AllowedDeviceChanges};

#[derive(Debug, Deserialize)]
pub struct CreateAllowedRequest {
    pub dev_eui: String,
    pub nwk_key: String,
    pub app_key: String,
    pub addr_key: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllowedList {
    pub devices: Vec<AllowedDevice>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

fn canonical_dev_eui(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// `POST /devices/allowed`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAllowedRequest>,
) -> AppResult<(StatusCode, Json<AllowedDevice>)> {
    let dev_eui = canonical_dev_eui(&req.dev_eui);
    validate::dev_eui(&dev_eui)?;
    validate::hex("nwk_key", &req.nwk_key, SESSION_KEY_LEN)?;
    validate::hex("app_key", &req.app_key, SESSION_KEY_LEN)?;
    validate::hex("addr_key", &req.addr_key, DEV_ADDR_LEN)?;

    let id = uuid::Uuid::new_v4().to_string();
    let allowed = state
        .db
        .create_allowed_device(
            &id,
            &dev_eui,
            &req.nwk_key,
            &req.app_key,
            &req.addr_key,
            req.description.as_deref(),
        )
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => {
                AppError::Conflict(format!("device {dev_eui} is already allow-listed"))
            }
            other => other,
        })?;

    info!(dev_eui = %dev_eui, "Device allow-listed");
    Ok((StatusCode::CREATED, Json(allowed)))
}

/// `GET /devices/allowed`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<AllowedList>> {
    let page = query.page_request();
    let (devices, total) = state.db.list_allowed_devices(page).await?;
    Ok(Json(AllowedList {
        devices,
        meta: page.meta(total),
    }))
}

/// `GET /devices/allowed/{dev_eui}`
pub async fn get(
    State(state): State<AppState>,
    Path(dev_eui): Path<String>,
) -> AppResult<Json<AllowedDevice>> {
    let allowed = state
        .db
        .get_allowed_device(&canonical_dev_eui(&dev_eui))
        .await?;
    Ok(Json(allowed))
}

/// `PUT /devices/allowed/{dev_eui}`
pub async fn update(
    State(state): State<AppState>,
    Path(dev_eui): Path<String>,
    Json(changes): Json<AllowedDeviceChanges>,
) -> AppResult<Json<MessageResponse>> {
    if changes.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }
    if let Some(key) = &changes.nwk_key {
        validate::hex("nwk_key", key, SESSION_KEY_LEN)?;
    }
    if let Some(key) = &changes.app_key {
        validate::hex("app_key", key, SESSION_KEY_LEN)?;
    }
    if let Some(key) = &changes.addr_key {
        validate::hex("addr_key", key, DEV_ADDR_LEN)?;
    }

    let dev_eui = canonical_dev_eui(&dev_eui);
    state.db.update_allowed_device(&dev_eui, &changes).await?;
    info!(dev_eui = %dev_eui, "Allowed device updated");
    Ok(MessageResponse::new("Allowed device updated successfully"))
}

/// `DELETE /devices/allowed/{dev_eui}`
pub async fn delete(
    State(state): State<AppState>,
    Path(dev_eui): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let dev_eui = canonical_dev_eui(&dev_eui);
    state.db.delete_allowed_device(&dev_eui).await?;
    info!(dev_eui = %dev_eui, "Allowed device removed");
    Ok(MessageResponse::new("Allowed device deleted successfully"))
}
