//! Error types for Toolcrib server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Idempotency key conflict: {0}")]
    IdempotencyKeyConflict(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub detail: String,
}

impl AppError {
    /// Wire name of the error variant, returned in the `error` field
    pub fn name(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NotFound",
            AppError::DuplicateId(_) => "DuplicateId",
            AppError::InvalidState(_) => "InvalidState",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::IdempotencyKeyConflict(_) => "IdempotencyKeyConflict",
            AppError::Timeout(_) => "Timeout",
            AppError::UnknownOperation(_) => "UnknownOperation",
            AppError::Internal(_) => "Internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateId(_) => StatusCode::CONFLICT,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::IdempotencyKeyConflict(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::UnknownOperation(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the failure is a terminal domain outcome. Terminal outcomes
    /// are stored in the idempotency ledger and replayed verbatim for
    /// duplicate keys; infrastructure-class failures stay unrecorded so a
    /// retry with the same key can still succeed.
    pub fn is_recordable(&self) -> bool {
        !matches!(
            self,
            AppError::Timeout(_)
                | AppError::Internal(_)
                | AppError::IdempotencyKeyConflict(_)
                | AppError::UnknownOperation(_)
        )
    }

    /// JSON body for the error, shared between HTTP responses and the
    /// idempotency ledger
    pub fn to_body(&self) -> serde_json::Value {
        let detail = match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            AppError::NotFound(msg)
            | AppError::DuplicateId(msg)
            | AppError::InvalidState(msg)
            | AppError::Unauthorized(msg)
            | AppError::InvalidInput(msg)
            | AppError::IdempotencyKeyConflict(msg)
            | AppError::Timeout(msg)
            | AppError::UnknownOperation(msg) => msg.clone(),
        };

        serde_json::json!(ErrorResponse {
            status: self.status_code().as_u16(),
            error: self.name().to_string(),
            detail,
        })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(ref msg) = self {
            tracing::error!("Internal error: {}", msg);
        }

        (self.status_code(), Json(self.to_body())).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
