//! Registration, login and the caller's profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::auth::Claims;
use crate::error::AppResult;
use crate::provisioning::Registration;
use crate::storage::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: String,
    pub email: String,
    pub message: &'static str,
}

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Registration>)> {
    let registration = state
        .provisioner
        .register(&req.email, &req.password, &req.full_name)
        .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (token, user) = state.provisioner.login(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

/// `GET /user/profile`
pub async fn profile(Extension(claims): Extension<Claims>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: claims.sub,
        email: claims.email,
        message: "Profile accessed successfully",
    })
}
