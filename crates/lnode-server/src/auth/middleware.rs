//! Bearer-token middleware for protected routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use super::jwt::JwtManager;
use crate::error::AppError;

/// Validate `Authorization: Bearer <jwt>` and insert the [`Claims`] into the
/// request extensions for handlers to extract.
///
/// [`Claims`]: super::Claims
pub async fn require_auth(
    State(jwt): State<Arc<JwtManager>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing authorization header".into()))?;

    let claims = jwt
        .validate(token)
        .map_err(|_| AppError::Unauthorized("Invalid token".into()))?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
