/// Error types for Story Service
///
/// This module defines all error types that can occur in the story-service.
/// Errors are converted to JSON HTTP responses of the form
/// `{ "error": <message>, "status": <code> }`.
use crate::db::StoreError;
use crate::services::payments::{GatewayError, SignatureError};
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;

/// Result type for story-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed input
    #[error("{0}")]
    ValidationError(String),

    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Action not allowed, e.g. a second vote from the same email
    #[error("{0}")]
    Forbidden(String),

    /// Duplicate resource
    #[error("{0}")]
    Conflict(String),

    /// Webhook signature verification failed
    #[error("Webhook Error: {0}")]
    Signature(#[from] SignatureError),

    /// Payment processor call failed
    #[error("Payment processor error: {0}")]
    Upstream(#[from] GatewayError),

    /// Record store failure
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    /// Message safe to show a client. Server-side failures are summarized,
    /// the detail goes to the log.
    fn public_message(&self) -> String {
        match self {
            AppError::Upstream(_) => "Payment session creation failed.".to_string(),
            AppError::Storage(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::Signature(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Upstream(_) | AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.public_message(),
            "status": status.as_u16(),
        }))
    }
}
