//! Device registry endpoints. Creation and deletion go through the
//! provisioning workflows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use lnode_core::{PageMeta, validate};
use serde::Serialize;
use tracing::info;

use super::{AppState, MessageResponse, PageQuery};
use crate::auth::Claims;
use crate::error::{AppError, AppResult};
use crate::provisioning::CreateDevice;
use crate::storage::{Device, DeviceChanges};

#[derive(Debug, Serialize)]
pub struct DeviceList {
    pub devices: Vec<Device>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// `POST /devices`, for the caller.
pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    let device = state.provisioner.create_device(&claims.sub, &req).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// `GET /devices/my`
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<DeviceList>> {
    let page = query.page_request();
    let (devices, total) = state.db.list_user_devices(&claims.sub, page).await?;
    Ok(Json(DeviceList {
        devices,
        meta: page.meta(total),
    }))
}

/// `GET /devices/all`
pub async fn list_all(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<DeviceList>> {
    let page = query.page_request();
    let (devices, total) = state.db.list_all_devices(page).await?;
    Ok(Json(DeviceList {
        devices,
        meta: page.meta(total),
    }))
}

/// `GET /devices/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Device>> {
    Ok(Json(state.db.get_device(&id).await?))
}

/// `PUT /devices/{id}`. A new `version_id` must exist.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<DeviceChanges>,
) -> AppResult<Json<Device>> {
    if changes.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }
    if let Some(name) = &changes.name {
        validate::required("name", name)?;
    }

    state.db.get_device(&id).await?;
    if let Some(version_id) = &changes.version_id {
        state.db.get_device_version(version_id).await?;
    }

    let device = state.db.update_device(&id, &changes).await?;
    info!(device_id = %id, "Device updated");
    Ok(Json(device))
}

/// `DELETE /devices/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.provisioner.delete_device(&id).await?;
    Ok(MessageResponse::new("Device deleted successfully"))
}
