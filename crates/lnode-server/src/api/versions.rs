//! Device catalog endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use lnode_core::{PageMeta, validate};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AppState, MessageResponse, PageQuery};
use crate::error::{AppError, AppResult};
use crate::storage::{DeviceVersion, DeviceVersionChanges};

#[derive(Debug, Deserialize)]
pub struct CreateVersionRequest {
    pub name: String,
    pub version: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VersionList {
    pub versions: Vec<DeviceVersion>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

/// `POST /devices/versions`
pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateVersionRequest>,
) -> AppResult<(StatusCode, Json<DeviceVersion>)> {
    validate::required("name", &req.name)?;
    validate::required("version", &req.version)?;

    let id = uuid::Uuid::new_v4().to_string();
    let version = state
        .db
        .create_device_version(
            &id,
            req.name.trim(),
            req.version.trim(),
            req.description.as_deref(),
        )
        .await?;

    info!(version_id = %id, name = %version.name, "Device version created");
    Ok((StatusCode::CREATED, Json(version)))
}

/// `GET /devices/versions`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<VersionList>> {
    let page = query.page_request();
    let (versions, total) = state.db.list_device_versions(page).await?;
    Ok(Json(VersionList {
        versions,
        meta: page.meta(total),
    }))
}

/// `GET /devices/versions/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DeviceVersion>> {
    Ok(Json(state.db.get_device_version(&id).await?))
}

/// `PUT /devices/versions/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(changes): Json<DeviceVersionChanges>,
) -> AppResult<Json<MessageResponse>> {
    if changes.is_empty() {
        return Err(AppError::validation("no fields to update"));
    }
    if let Some(name) = &changes.name {
        validate::required("name", name)?;
    }
    if let Some(version) = &changes.version {
        validate::required("version", version)?;
    }

    state.db.update_device_version(&id, &changes).await?;
    info!(version_id = %id, "Device version updated");
    Ok(MessageResponse::new("Device version updated successfully"))
}

/// `DELETE /devices/versions/{id}`. Devices referencing it keep the id.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.db.delete_device_version(&id).await?;
    info!(version_id = %id, "Device version deleted");
    Ok(MessageResponse::new("Device version deleted successfully"))
}
