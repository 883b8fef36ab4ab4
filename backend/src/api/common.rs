//! Response envelope and error conversion for API handlers.
//!
//! All responses share one JSON shape:
//! - `success`: whether the request succeeded
//! - `data`: payload on success
//! - `message`: human-readable message
//! - `error.error_type`: machine-readable error kind on failure
//! - `timestamp`: RFC 3339 time of the response
//!
//! # Error Handling Flow
//! 1. Services return a `ServiceError`
//! 2. `service_error_to_http` picks the status code and builds the envelope
//! 3. Store failures are logged and replaced by a generic message

use crate::errors::ServiceError;
use axum::{Json, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Standard API response wrapper for all endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Indicates if the request was successful
    pub success: bool,
    /// Response data (present on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Human-readable message
    pub message: String,
    /// Error details (present on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,
    /// Request timestamp
    pub timestamp: String,
}

/// Error details for failed requests
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Machine-readable error type identifier
    pub error_type: String,
}

/// Error half of every handler result.
pub type ApiError = (StatusCode, Json<ApiResponse<()>>);

impl<T> ApiResponse<T> {
    /// Create a successful response
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>, error_type: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message: message.into(),
            error: Some(ErrorDetails {
                error_type: error_type.into(),
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ApiResponse<()> {
    /// Create a successful response without payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: message.into(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Converts ServiceError to appropriate HTTP response with standard format
pub fn service_error_to_http(error: ServiceError) -> ApiError {
    let error_type = error.kind();
    let (status, message) = match error {
        ServiceError::Validation { message } => (StatusCode::BAD_REQUEST, message),
        ServiceError::DuplicateEmail { .. } => {
            (StatusCode::CONFLICT, "User already exists".to_string())
        }
        ServiceError::DuplicateGithubId { .. } => (
            StatusCode::CONFLICT,
            "GitHub identity already linked".to_string(),
        ),
        ServiceError::WrongPassword => (StatusCode::UNAUTHORIZED, "Wrong password".to_string()),
        ServiceError::NotFound { entity, .. } => {
            (StatusCode::NOT_FOUND, format!("{} not found", entity))
        }
        ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
        ServiceError::LinkingFailure { message } => {
            tracing::error!("GitHub linking failed: {}", message);
            (StatusCode::UNAUTHORIZED, "GitHub login failed".to_string())
        }
        ServiceError::DestroyFailed { message } => {
            tracing::error!("Logout failed: {}", message);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Logout failed".to_string(),
            )
        }
        ServiceError::Database { source } => {
            tracing::error!("Database error: {}", source);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
        ServiceError::ExternalService { message } => (StatusCode::BAD_GATEWAY, message),
    };

    (status, Json(ApiResponse::<()>::error(message, error_type)))
}
