//! Error handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use dispre_core::HazardError;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("validation error: {0}")]
    ValidationError(String),

    // Model lifecycle
    #[error("models not ready: {0}")]
    NotTrained(String),

    // Server-side errors
    #[error("configuration error: {0}")]
    ConfigurationError(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::NotTrained(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.as_str()),
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Engine configuration error")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<HazardError> for AppError {
    fn from(err: HazardError) -> Self {
        match err {
            HazardError::InvalidInput(_) => AppError::ValidationError(err.to_string()),
            HazardError::NotTrained { .. } => AppError::NotTrained(err.to_string()),
            HazardError::Configuration(_) | HazardError::LayoutMismatch { .. } => {
                AppError::ConfigurationError(err.to_string())
            }
            HazardError::Io(_) | HazardError::Serialization(_) => AppError::InternalError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("prediction task failed: {}", err))
    }
}
