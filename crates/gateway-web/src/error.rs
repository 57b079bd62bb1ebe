//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use ticket_store::StoreError;

/// Errors that can occur handling gateway requests.
///
/// Authorization failures never mutate state; they surface as 4xx with no
/// side effects. Store failures surface as 5xx so callers never mistake a
/// lost write for success.
#[derive(Debug, Error)]
pub enum AppError {
    /// No valid session.
    #[error("{0}")]
    Unauthorized(String),

    /// Valid session, wrong role, or a bad approval token.
    #[error("{0}")]
    Forbidden(String),

    /// Requested entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Malformed or invalid request.
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate entity.
    #[error("{0}")]
    Conflict(String),

    /// Store error.
    #[error("store error: {0}")]
    Store(StoreError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => {
                AppError::NotFound(format!("{} not found: {}", entity, id))
            }
            StoreError::AlreadyExists { entity, id } => {
                AppError::Conflict(format!("{} already exists: {}", entity, id))
            }
            other => AppError::Store(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Store(err) => {
                tracing::error!("Store error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for gateway handlers.
pub type Result<T> = std::result::Result<T, AppError>;
