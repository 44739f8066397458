//! Confidence Calibration
//!
//! Fixed logistic mapping from a raw anomaly score (higher = more anomalous,
//! 0 at the model's contamination boundary) to an anomaly confidence in [0, 1]:
//!
//! ```text
//! confidence = 1 / (1 + exp(-steepness * (raw - midpoint)))
//! ```
//!
//! With the defaults an ordinary inlier (raw ≈ -0.10) maps to an anomaly
//! confidence of ≈ 0.05, i.e. a Valid confidence of ≈ 0.95, and the default
//! suspicion threshold of 0.7 corresponds to raw ≈ +0.028.

use serde::{Deserialize, Serialize};

/// Default logistic midpoint (model decision boundary)
pub const DEFAULT_MIDPOINT: f64 = 0.0;

/// Default logistic steepness
pub const DEFAULT_STEEPNESS: f64 = 30.0;

/// Logistic calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceCalibration {
    pub midpoint: f64,
    pub steepness: f64,
}

impl Default for ConfidenceCalibration {
    fn default() -> Self {
        Self {
            midpoint: DEFAULT_MIDPOINT,
            steepness: DEFAULT_STEEPNESS,
        }
    }
}

impl ConfidenceCalibration {
    /// Map a raw anomaly score to a confidence in [0, 1]
    pub fn confidence(&self, raw_score: f64) -> f64 {
        if raw_score.is_nan() {
            return 0.5;
        }
        let z = self.steepness * (raw_score - self.midpoint);
        (1.0 / (1.0 + (-z).exp())).clamp(0.0, 1.0)
    }

    /// Inverse mapping, used to express a confidence threshold as a raw score
    pub fn raw_for_confidence(&self, confidence: f64) -> f64 {
        let c = confidence.clamp(1e-12, 1.0 - 1e-12);
        self.midpoint + (c / (1.0 - c)).ln() / self.steepness
    }
}
