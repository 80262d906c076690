//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::AuthError;
use crate::store::StoreError;

/// Fixed user-facing message for all 500 responses. Server-side detail
/// is logged, never returned to the client.
const INTERNAL_MESSAGE: &str = "An internal server error occurred.";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input.
    #[error("validation error: {0}")]
    Validation(String),

    /// No valid session or bad credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Duplicate resource (e.g., username already registered).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Referenced entity absent (or not owned by the caller).
    #[error("not found: {0}")]
    NotFound(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => {
                Self::Unauthorized("Invalid username or password.".to_owned())
            }
            AuthError::UsernameTaken => Self::Conflict("Username already exists.".to_owned()),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_owned()),
            AuthError::Store(store) => Self::Store(store),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Store(StoreError::Database(_) | StoreError::Corrupt(_)) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "API request error"
            );
        }

        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) | Self::Store(StoreError::Conflict(_)) => StatusCode::CONFLICT,
            Self::NotFound(_) | Self::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Validation(msg) | Self::Unauthorized(msg) | Self::Conflict(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Store(StoreError::Conflict(_)) => "Resource already exists.".to_owned(),
            Self::Store(StoreError::NotFound) => "Not found.".to_owned(),
            Self::Store(_) | Self::Internal(_) => INTERNAL_MESSAGE.to_owned(),
        };

        (status, Json(json!({ "status": "error", "message": message }))).into_response()
    }
}
