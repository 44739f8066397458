//! Standard Scaler
//!
//! Frozen per-feature standardization `(x - mean) / scale` fitted offline.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Fitted standard scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean
    pub mean: Vec<f64>,
    /// Per-feature standard deviation
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Create and validate a scaler
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> CoreResult<Self> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Identity scaler for `n` features
    pub fn identity(n: usize) -> Self {
        Self {
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Check artifact consistency
    pub fn validate(&self) -> CoreResult<()> {
        if self.mean.is_empty() {
            return Err(CoreError::invalid_artifact("scaler has no features"));
        }
        if self.mean.len() != self.scale.len() {
            return Err(CoreError::invalid_artifact(format!(
                "scaler mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(CoreError::invalid_artifact("scaler contains non-finite values"));
        }
        if self.scale.iter().any(|s| *s < 0.0) {
            return Err(CoreError::invalid_artifact("scaler contains negative scale"));
        }
        Ok(())
    }

    /// Standardize one sample
    pub fn transform(&self, sample: &[f64]) -> CoreResult<Vec<f64>> {
        if sample.len() != self.n_features() {
            return Err(CoreError::FeatureDimension {
                expected: self.n_features(),
                actual: sample.len(),
            });
        }

        Ok(sample
            .iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(x, (mean, scale))| {
                // zero-variance features are only centered
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}
