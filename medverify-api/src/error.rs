//! API Error Types
//!
//! Infrastructure failures map to 5xx codes distinct from the four
//! verification statuses; a registry outage is never reported as Fake.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use medverify_engine::EngineError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metrics::record_error;

/// API-specific errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Validation error
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// Unauthorized access
    #[error("Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// Batch registry unreachable
    #[error("Registry unavailable: {reason}")]
    LookupUnavailable { reason: String },

    /// Anomaly model missing or failed
    #[error("Scorer unavailable: {reason}")]
    ScorerUnavailable { reason: String },

    /// Other backing service unavailable
    #[error("Service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code
    pub code: String,
    /// Error message
    pub message: String,
    /// Optional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::LookupUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ScorerUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized { .. } => "UNAUTHORIZED",
            ApiError::LookupUnavailable { .. } => "LOOKUP_UNAVAILABLE",
            ApiError::ScorerUnavailable { .. } => "SCORER_UNAVAILABLE",
            ApiError::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal {
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::InvalidInput { message, .. } => ApiError::ValidationError { message },
            EngineError::LookupUnavailable { reason } => ApiError::LookupUnavailable { reason },
            EngineError::ScorerUnavailable { reason } => ApiError::ScorerUnavailable { reason },
            EngineError::LogUnavailable { reason } => ApiError::ServiceUnavailable { reason },
            EngineError::Internal(message) => ApiError::Internal { message },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }
        record_error(self.error_code());

        let error_response = ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: None,
        };

        (status, Json(error_response)).into_response()
    }
}
