//! Feature Extraction
//!
//! Builds the fixed-order behavioral feature vector consumed by the anomaly
//! model: manufacturer reliability, clamped days-to-expiry, scan count and
//! geographic dispersion of recent scans.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::expiry::ExpiryState;
use crate::types::{BatchRecord, GeoPoint};

/// Number of model features
pub const FEATURE_COUNT: usize = 4;

/// Feature names, in model order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "manufacturer_reliability",
    "days_to_expiry",
    "scan_count",
    "distinct_regions",
];

/// Feature extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Lower clamp for days-to-expiry
    pub min_days_to_expiry: i64,
    /// Upper clamp for days-to-expiry
    pub max_days_to_expiry: i64,
    /// Number of most recent locations considered
    pub recent_location_window: usize,
    /// Grid cell size (degrees) used to bucket locations into regions
    pub region_cell_degrees: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_days_to_expiry: -365,
            max_days_to_expiry: 1095,
            recent_location_window: 50,
            region_cell_degrees: 1.0,
        }
    }
}

/// Behavioral features of one batch at verification time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub manufacturer_reliability: f64,
    pub days_to_expiry: f64,
    pub scan_count: f64,
    pub distinct_regions: f64,
}

impl FeatureVector {
    /// Values in model order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.manufacturer_reliability,
            self.days_to_expiry,
            self.scan_count,
            self.distinct_regions,
        ]
    }
}

/// Feature extractor
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Extract features from a record whose scan count already includes the
    /// current verification.
    pub fn extract(&self, record: &BatchRecord, expiry: &ExpiryState) -> FeatureVector {
        let days = expiry.days_remaining.clamp(
            self.config.min_days_to_expiry,
            self.config.max_days_to_expiry,
        );

        let window = self.config.recent_location_window;
        let start = record.scan_locations.len().saturating_sub(window);
        let regions = self.distinct_regions(&record.scan_locations[start..]);

        FeatureVector {
            manufacturer_reliability: record.manufacturer_reliability,
            days_to_expiry: days as f64,
            scan_count: record.scan_count as f64,
            distinct_regions: regions as f64,
        }
    }

    /// Count distinct grid cells; a batch with no recorded location counts as one region
    pub fn distinct_regions(&self, locations: &[GeoPoint]) -> usize {
        let cell = if self.config.region_cell_degrees > 0.0 {
            self.config.region_cell_degrees
        } else {
            1.0
        };

        let cells: HashSet<(i64, i64)> = locations
            .iter()
            .map(|p| {
                (
                    (p.latitude / cell).floor() as i64,
                    (p.longitude / cell).floor() as i64,
                )
            })
            .collect();

        cells.len().max(1)
    }
}
