//! Anomaly Scoring
//!
//! The anomaly model is process-wide immutable state: loaded once at startup
//! and shared read-only between requests. It is injected behind the
//! [`AnomalyScorer`] trait so tests and demos can substitute a deterministic
//! scorer.
//!
//! Raw scores follow one convention everywhere: higher means more anomalous,
//! 0 sits at the model's contamination boundary.

pub mod calibration;
pub mod forest;
pub mod scaler;

pub use calibration::ConfidenceCalibration;
pub use forest::{IsolationForest, IsolationTree, TreeNode};
pub use scaler::StandardScaler;

use std::path::Path;

use crate::error::{CoreError, CoreResult};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// Frozen anomaly model
pub trait AnomalyScorer: Send + Sync {
    /// Raw anomaly score for a feature vector (higher = more anomalous)
    fn score(&self, features: &FeatureVector) -> CoreResult<f64>;

    /// Model version label
    fn model_version(&self) -> &str;

    /// Whether the scorer can produce scores at all
    fn is_ready(&self) -> bool {
        true
    }
}

/// Scaler + isolation forest loaded from exported artifacts
#[derive(Debug, Clone)]
pub struct ModelScorer {
    scaler: StandardScaler,
    forest: IsolationForest,
}

impl ModelScorer {
    /// Assemble a scorer from validated parts
    pub fn from_parts(scaler: StandardScaler, forest: IsolationForest) -> CoreResult<Self> {
        scaler.validate()?;
        forest.validate()?;

        if scaler.n_features() != FEATURE_COUNT || forest.n_features != FEATURE_COUNT {
            return Err(CoreError::invalid_artifact(format!(
                "expected {} features, scaler has {} and model has {}",
                FEATURE_COUNT,
                scaler.n_features(),
                forest.n_features
            )));
        }

        Ok(Self { scaler, forest })
    }

    /// Load JSON artifacts from disk
    pub fn load(model_path: impl AsRef<Path>, scaler_path: impl AsRef<Path>) -> CoreResult<Self> {
        let forest: IsolationForest = read_artifact(model_path.as_ref())?;
        let scaler: StandardScaler = read_artifact(scaler_path.as_ref())?;
        let scorer = Self::from_parts(scaler, forest)?;

        tracing::info!(
            model_version = %scorer.forest.version,
            trees = scorer.forest.trees.len(),
            "Anomaly model loaded"
        );

        Ok(scorer)
    }
}

fn read_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> CoreResult<T> {
    let bytes = std::fs::read(path).map_err(|e| CoreError::ArtifactLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| CoreError::ArtifactLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

impl AnomalyScorer for ModelScorer {
    fn score(&self, features: &FeatureVector) -> CoreResult<f64> {
        let scaled = self.scaler.transform(&features.to_array())?;
        let raw = -self.forest.decision_function(&scaled)?;
        if !raw.is_finite() {
            return Err(CoreError::NonFiniteScore);
        }
        Ok(raw)
    }

    fn model_version(&self) -> &str {
        &self.forest.version
    }
}

/// Scorer returning a constant raw score.
///
/// Used for fixtures and local demos where no trained model is deployed.
#[derive(Debug, Clone, Copy)]
pub struct FixedScorer {
    raw: f64,
}

impl FixedScorer {
    pub fn new(raw: f64) -> Self {
        Self { raw }
    }
}

impl AnomalyScorer for FixedScorer {
    fn score(&self, _features: &FeatureVector) -> CoreResult<f64> {
        Ok(self.raw)
    }

    fn model_version(&self) -> &str {
        "fixed"
    }
}

/// Placeholder installed when the model failed to load; every call errors
#[derive(Debug, Clone)]
pub struct UnavailableScorer {
    reason: String,
}

impl UnavailableScorer {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl AnomalyScorer for UnavailableScorer {
    fn score(&self, _features: &FeatureVector) -> CoreResult<f64> {
        Err(CoreError::scorer_unavailable(self.reason.clone()))
    }

    fn model_version(&self) -> &str {
        "unavailable"
    }

    fn is_ready(&self) -> bool {
        false
    }
}
