//! Application error types and HTTP response conversion.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::db::RepositoryError;
use crate::services::email::EmailError;

/// Top-level application error.
///
/// Converts into a JSON error response; internal details are logged but not
/// exposed to clients.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("repository error: {0}")]
    Database(#[from] RepositoryError),

    #[error("email error: {0}")]
    Email(#[from] EmailError),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => {
                (StatusCode::NOT_FOUND, "Not found".to_owned())
            }
            Self::Database(RepositoryError::Conflict(message)) => (StatusCode::CONFLICT, message),
            Self::Database(err) => {
                error!(error = %err, "repository error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
            Self::Email(err) => {
                error!(error = %err, "failed to send email");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_owned(),
                )
            }
            Self::Session(err) => {
                error!(error = %err, "session error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => {
                error!(error = %message, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_owned(),
                )
            }
        };

        (status, Json(json!({ "success": false, "errors": [message] }))).into_response()
    }
}
