//! Engine Error Types
//!
//! Infrastructure failures are reported through this channel, never as one
//! of the four verification statuses.

use medverify_core::CoreError;
use medverify_store::StoreError;
use thiserror::Error;

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected request; nothing was classified
    #[error("Invalid input: {message}")]
    InvalidInput { code: &'static str, message: String },

    /// Batch registry unreachable or timed out
    #[error("Registry unavailable: {reason}")]
    LookupUnavailable { reason: String },

    /// Model missing, failed or timed out
    #[error("Scorer unavailable: {reason}")]
    ScorerUnavailable { reason: String },

    /// Log or stats backend failure on a read path
    #[error("Log unavailable: {reason}")]
    LogUnavailable { reason: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create an invalid input error
    pub fn invalid_input(code: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            code,
            message: message.into(),
        }
    }

    /// Create a lookup unavailable error
    pub fn lookup_unavailable(reason: impl Into<String>) -> Self {
        Self::LookupUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a scorer unavailable error
    pub fn scorer_unavailable(reason: impl Into<String>) -> Self {
        Self::ScorerUnavailable {
            reason: reason.into(),
        }
    }

    /// Metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::LookupUnavailable { .. } => "lookup_unavailable",
            Self::ScorerUnavailable { .. } => "scorer_unavailable",
            Self::LogUnavailable { .. } => "log_unavailable",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        if err.is_input_error() {
            return Self::InvalidInput {
                code: err.code(),
                message: err.to_string(),
            };
        }
        match err {
            CoreError::ScoreRequired { .. } => Self::Internal(err.to_string()),
            other => Self::ScorerUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidQuery(message) => Self::InvalidInput {
                code: "MV-INPUT-003",
                message,
            },
            other => Self::LookupUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_input_errors_map_to_invalid_input() {
        let err: EngineError = CoreError::invalid_code("batch code is empty").into();
        assert!(matches!(
            err,
            EngineError::InvalidInput {
                code: "MV-INPUT-001",
                ..
            }
        ));
    }

    #[test]
    fn test_core_scoring_errors_map_to_scorer_unavailable() {
        let err: EngineError = CoreError::NonFiniteScore.into();
        assert_eq!(err.kind(), "scorer_unavailable");
    }

    #[test]
    fn test_store_errors() {
        let err: EngineError = StoreError::database("connection refused").into();
        assert_eq!(err.kind(), "lookup_unavailable");

        let err: EngineError = StoreError::invalid_query("limit must be at least 1").into();
        assert_eq!(err.kind(), "invalid_input");
    }
}
