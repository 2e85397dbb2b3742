//! User directory endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use lnode_core::{PageMeta, validate};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{AppState, MessageResponse, PageQuery};
use crate::auth::password;
use crate::error::{AppError, AppResult};
use crate::storage::{PublicUser, User, UserChanges};

#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<User>,
    #[serde(flatten)]
    pub meta: PageMeta,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    #[serde(flatten)]
    pub page: PageQuery,
}

/// Empty strings mean "leave unchanged".
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub password: Option<String>,
}

fn supplied(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// `GET /users`
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UserList>> {
    let page = query.page_request();
    let (users, total) = state.db.list_users(page).await?;
    Ok(Json(UserList {
        users,
        meta: page.meta(total),
    }))
}

/// `GET /users/search?q=`. An empty query lists everyone.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<UserList>> {
    let page = query.page.page_request();
    let (users, total) = match supplied(query.q.as_ref()) {
        Some(q) => state.db.search_users(q, page).await?,
        None => state.db.list_users(page).await?,
    };
    Ok(Json(UserList {
        users,
        meta: page.meta(total),
    }))
}

/// `GET /users/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PublicUser>> {
    let user = state.db.get_user(&id).await?;
    Ok(Json(user.into()))
}

/// `PUT /users/{id}`. Supplying nothing that differs is a no-op.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> AppResult<Json<PublicUser>> {
    let existing = state.db.get_user(&id).await?;
    let mut changes = UserChanges::default();

    if let Some(email) = supplied(req.email.as_ref()) {
        let email = validate::normalize_email(email);
        validate::email(&email)?;
        if email != existing.email {
            if let Some(other) = state.db.find_user_by_email(&email).await? {
                if other.id != id {
                    return Err(AppError::Conflict("email already exists".into()));
                }
            }
            changes.email = Some(email);
        }
    }
    if let Some(full_name) = supplied(req.full_name.as_ref()) {
        changes.full_name = Some(full_name.to_string());
    }
    if let Some(new_password) = req.password.as_deref().filter(|p| !p.is_empty()) {
        validate::password(new_password)?;
        let hash = password::hash_password(new_password).map_err(AppError::internal)?;
        changes.password_hash = Some(hash);
    }

    if changes.is_empty() {
        return Ok(Json(existing.into()));
    }

    let user = state.db.update_user(&id, &changes).await?;
    info!(user_id = %id, "User updated");
    Ok(Json(user.into()))
}

/// `DELETE /users/{id}`. The user's devices are kept.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state.db.delete_user(&id).await?;
    info!(user_id = %id, "User deleted");
    Ok(MessageResponse::new("User deleted successfully"))
}
