//! Engine Configuration

use medverify_core::classify::{
    DEFAULT_EXPIRED_CONFIDENCE, DEFAULT_NOT_FOUND_CONFIDENCE, DEFAULT_SUSPICION_THRESHOLD,
};
use medverify_core::{ClassifierConfig, FeatureConfig};
use std::env;
use std::time::Duration;

/// Default registry call timeout
pub const DEFAULT_REGISTRY_TIMEOUT_MS: u64 = 2_000;

/// Default scorer timeout
pub const DEFAULT_SCORER_TIMEOUT_MS: u64 = 1_000;

/// Default log append timeout
pub const DEFAULT_LOG_TIMEOUT_MS: u64 = 1_000;

/// Default stats window in days
pub const DEFAULT_STATS_DAYS: u32 = 7;

/// Verification engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on each registry call
    pub registry_timeout: Duration,
    /// Bound on one scorer invocation
    pub scorer_timeout: Duration,
    /// Bound on one log append
    pub log_timeout: Duration,
    /// Decision table settings
    pub classifier: ClassifierConfig,
    /// Feature extraction settings
    pub features: FeatureConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            registry_timeout: Duration::from_millis(DEFAULT_REGISTRY_TIMEOUT_MS),
            scorer_timeout: Duration::from_millis(DEFAULT_SCORER_TIMEOUT_MS),
            log_timeout: Duration::from_millis(DEFAULT_LOG_TIMEOUT_MS),
            classifier: ClassifierConfig::default(),
            features: FeatureConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl EngineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - MEDVERIFY_REGISTRY_TIMEOUT_MS: registry call timeout
    /// - MEDVERIFY_SCORER_TIMEOUT_MS: scorer timeout
    /// - MEDVERIFY_LOG_TIMEOUT_MS: log append timeout
    /// - MEDVERIFY_SUSPICION_THRESHOLD: anomaly confidence above which a batch is suspected
    /// - MEDVERIFY_EXPIRED_CONFIDENCE: confidence reported for expired batches
    /// - MEDVERIFY_NOT_FOUND_CONFIDENCE: confidence reported for unknown codes
    /// - MEDVERIFY_MIN_DAYS_TO_EXPIRY / MEDVERIFY_MAX_DAYS_TO_EXPIRY: feature clamp
    /// - MEDVERIFY_LOCATION_WINDOW: recent locations considered for dispersion
    /// - MEDVERIFY_REGION_CELL_DEGREES: region grid size
    pub fn from_env() -> Self {
        let defaults = FeatureConfig::default();

        Self {
            registry_timeout: Duration::from_millis(
                parse_env("MEDVERIFY_REGISTRY_TIMEOUT_MS").unwrap_or(DEFAULT_REGISTRY_TIMEOUT_MS),
            ),
            scorer_timeout: Duration::from_millis(
                parse_env("MEDVERIFY_SCORER_TIMEOUT_MS").unwrap_or(DEFAULT_SCORER_TIMEOUT_MS),
            ),
            log_timeout: Duration::from_millis(
                parse_env("MEDVERIFY_LOG_TIMEOUT_MS").unwrap_or(DEFAULT_LOG_TIMEOUT_MS),
            ),
            classifier: ClassifierConfig {
                suspicion_threshold: parse_env("MEDVERIFY_SUSPICION_THRESHOLD")
                    .unwrap_or(DEFAULT_SUSPICION_THRESHOLD),
                expired_confidence: parse_env("MEDVERIFY_EXPIRED_CONFIDENCE")
                    .unwrap_or(DEFAULT_EXPIRED_CONFIDENCE),
                not_found_confidence: parse_env("MEDVERIFY_NOT_FOUND_CONFIDENCE")
                    .unwrap_or(DEFAULT_NOT_FOUND_CONFIDENCE),
                ..Default::default()
            },
            features: FeatureConfig {
                min_days_to_expiry: parse_env("MEDVERIFY_MIN_DAYS_TO_EXPIRY")
                    .unwrap_or(defaults.min_days_to_expiry),
                max_days_to_expiry: parse_env("MEDVERIFY_MAX_DAYS_TO_EXPIRY")
                    .unwrap_or(defaults.max_days_to_expiry),
                recent_location_window: parse_env("MEDVERIFY_LOCATION_WINDOW")
                    .unwrap_or(defaults.recent_location_window),
                region_cell_degrees: parse_env("MEDVERIFY_REGION_CELL_DEGREES")
                    .unwrap_or(defaults.region_cell_degrees),
            },
        }
    }

    /// Set the suspicion threshold
    pub fn with_suspicion_threshold(mut self, threshold: f64) -> Self {
        self.classifier.suspicion_threshold = threshold;
        self
    }

    /// Set the scorer timeout
    pub fn with_scorer_timeout(mut self, timeout: Duration) -> Self {
        self.scorer_timeout = timeout;
        self
    }
}
