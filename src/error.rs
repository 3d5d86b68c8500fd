//! Error handling module
//!
//! Centralized error taxonomy and HTTP response conversion.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::ValidationErrors;
use crate::store::StoreError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
///
/// Callers inspect the variant, never a string: `NotFound` and
/// `InactiveAccount` come out of scope resolution, `Validation` out of
/// input checking, and everything else is an infrastructure failure that
/// aborts the operation with no partial effect.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{object} not found with id {id}")]
    NotFound { object: &'static str, id: Uuid },

    #[error("account is inactive and cannot receive new cards or transactions")]
    InactiveAccount,

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("Missing required header: {0}")]
    MissingHeader(&'static str),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // Server errors (5xx)
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(object: &'static str, id: Uuid) -> Self {
        Self::NotFound { object, id }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, details) = match &self {
            // 404 Not Found
            AppError::NotFound { object, id } => (
                StatusCode::NOT_FOUND,
                "not_found",
                Some(serde_json::json!({ "object": object, "id": id })),
            ),

            // 400 Bad Request
            AppError::InactiveAccount => (StatusCode::BAD_REQUEST, "inactive_account", None),
            AppError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                Some(serde_json::json!({ "errors": errors.errors })),
            ),
            AppError::MissingHeader(header) => (
                StatusCode::BAD_REQUEST,
                "missing_header",
                Some(serde_json::json!(header)),
            ),
            AppError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                Some(serde_json::json!(msg)),
            ),

            // 500 Internal Server Error - log context, expose nothing
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", None)
            }
            AppError::Config(e) => {
                tracing::error!("Config error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "config_error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let error = match &self {
            // Never leak storage internals to the caller.
            AppError::Store(_)
            | AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error,
            error_code: error_code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let id = Uuid::new_v4();
        let err = AppError::not_found("card", id);
        let msg = err.to_string();
        assert!(msg.contains("card"));
        assert!(msg.contains(&id.to_string()));
    }

    #[test]
    fn test_validation_error_from_map() {
        let mut errors = ValidationErrors::new();
        errors.add("category", "cannot be empty");
        let err: AppError = errors.into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
