//! Core Error Codes
//!
//! Error code format: MV-{module}-{sequence}
//! - MV-INPUT: Request input errors
//! - MV-MODEL: Model artifact errors
//! - MV-SCORE: Scoring errors
//! - MV-CLASSIFY: Decision table errors

use thiserror::Error;

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    // ============================================================
    // Input Errors (MV-INPUT-*)
    // ============================================================
    /// [MV-INPUT-001] Batch code missing or malformed
    #[error("[MV-INPUT-001] Invalid batch code: {reason}")]
    InvalidBatchCode { reason: String },

    /// [MV-INPUT-002] Coordinates outside the valid range
    #[error("[MV-INPUT-002] Invalid location: lat={latitude}, lng={longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    // ============================================================
    // Model Errors (MV-MODEL-*)
    // ============================================================
    /// [MV-MODEL-001] Model artifact could not be read
    #[error("[MV-MODEL-001] Failed to load model artifact {path}: {message}")]
    ArtifactLoad { path: String, message: String },

    /// [MV-MODEL-002] Model artifact is structurally invalid
    #[error("[MV-MODEL-002] Invalid model artifact: {message}")]
    InvalidArtifact { message: String },

    // ============================================================
    // Scoring Errors (MV-SCORE-*)
    // ============================================================
    /// [MV-SCORE-001] Feature vector does not match the model
    #[error("[MV-SCORE-001] Feature dimension mismatch: expected {expected}, got {actual}")]
    FeatureDimension { expected: usize, actual: usize },

    /// [MV-SCORE-002] Scorer is not available
    #[error("[MV-SCORE-002] Anomaly scorer unavailable: {reason}")]
    ScorerUnavailable { reason: String },

    /// [MV-SCORE-003] Model produced a non-finite score
    #[error("[MV-SCORE-003] Model produced a non-finite score")]
    NonFiniteScore,

    // ============================================================
    // Classification Errors (MV-CLASSIFY-*)
    // ============================================================
    /// [MV-CLASSIFY-001] Decision reached a rule that needs an anomaly score
    #[error("[MV-CLASSIFY-001] Rule {rule} requires an anomaly score")]
    ScoreRequired { rule: String },
}

impl CoreError {
    /// Create an invalid batch code error
    pub fn invalid_code(reason: impl Into<String>) -> Self {
        Self::InvalidBatchCode {
            reason: reason.into(),
        }
    }

    /// Create an invalid artifact error
    pub fn invalid_artifact(message: impl Into<String>) -> Self {
        Self::InvalidArtifact {
            message: message.into(),
        }
    }

    /// Create a scorer unavailable error
    pub fn scorer_unavailable(reason: impl Into<String>) -> Self {
        Self::ScorerUnavailable {
            reason: reason.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidBatchCode { .. } => "MV-INPUT-001",
            Self::InvalidLocation { .. } => "MV-INPUT-002",
            Self::ArtifactLoad { .. } => "MV-MODEL-001",
            Self::InvalidArtifact { .. } => "MV-MODEL-002",
            Self::FeatureDimension { .. } => "MV-SCORE-001",
            Self::ScorerUnavailable { .. } => "MV-SCORE-002",
            Self::NonFiniteScore => "MV-SCORE-003",
            Self::ScoreRequired { .. } => "MV-CLASSIFY-001",
        }
    }

    /// Input errors are the caller's fault; everything else is infrastructure
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBatchCode { .. } | Self::InvalidLocation { .. }
        )
    }
}
