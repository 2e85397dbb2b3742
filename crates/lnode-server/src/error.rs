//! API error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::platform::PlatformError;
use crate::storage::DatabaseError;

/// Error body returned to clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure kinds surfaced by handlers and workflows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    /// A business rule blocks the operation.
    #[error("{0}")]
    FailedPrecondition(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("external service error: {0}")]
    ExternalService(#[from] PlatformError),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl ToString) -> Self {
        Self::Internal(msg.to_string())
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::FailedPrecondition(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) | Self::ExternalService(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side failures stay opaque.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_string(),
            Self::ExternalService(_) => "External service error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::NotFound(what) => Self::NotFound(format!("{what} not found")),
            DatabaseError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<lnode_core::Error> for AppError {
    fn from(e: lnode_core::Error) -> Self {
        match e {
            lnode_core::Error::Validation(msg) => Self::Validation(msg),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        let body = ErrorResponse {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers and workflows.
pub type AppResult<T> = std::result::Result<T, AppError>;
