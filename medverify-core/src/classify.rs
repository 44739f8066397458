//! Classification Aggregator
//!
//! Ordered decision table combining registry presence, expiry state and the
//! calibrated anomaly confidence into one of four statuses.
//!
//! | # | Rule      | Predicate                                  | Needs score | Confidence            |
//! |---|-----------|--------------------------------------------|-------------|-----------------------|
//! | 1 | Fake      | batch not in registry                      | no          | `not_found_confidence`|
//! | 2 | Expired   | found, `days_remaining < 0`                | no          | `expired_confidence`  |
//! | 3 | Suspected | found, anomaly confidence > threshold      | yes         | anomaly confidence    |
//! | 4 | Valid     | found (anything reaching this row)         | yes         | 1 − anomaly confidence|
//!
//! The first matching row wins. Rows that need a score are only evaluated when
//! the score is present; [`Classifier::requires_score`] tells the caller whether
//! scoring is necessary before calling [`Classifier::classify`].

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::expiry::ExpiryState;
use crate::scoring::ConfidenceCalibration;
use crate::types::VerificationStatus;

/// Default anomaly confidence above which a batch is suspected
pub const DEFAULT_SUSPICION_THRESHOLD: f64 = 0.7;

/// Default confidence for an expired batch
pub const DEFAULT_EXPIRED_CONFIDENCE: f64 = 0.99;

/// Default confidence for a code absent from the registry
pub const DEFAULT_NOT_FOUND_CONFIDENCE: f64 = 1.0;

/// Decision table configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Anomaly confidence strictly above which a batch is Suspected
    pub suspicion_threshold: f64,
    /// Confidence reported for Expired
    pub expired_confidence: f64,
    /// Confidence reported for Fake
    pub not_found_confidence: f64,
    /// Raw score → anomaly confidence mapping
    pub calibration: ConfidenceCalibration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            suspicion_threshold: DEFAULT_SUSPICION_THRESHOLD,
            expired_confidence: DEFAULT_EXPIRED_CONFIDENCE,
            not_found_confidence: DEFAULT_NOT_FOUND_CONFIDENCE,
            calibration: ConfidenceCalibration::default(),
        }
    }
}

/// Facts gathered for one verification request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evidence {
    /// Registry lookup returned nothing
    NotFound,
    /// Record found
    Found {
        expiry: ExpiryState,
        /// Raw anomaly score, when already computed
        anomaly_score: Option<f64>,
    },
}

impl Evidence {
    /// Evidence for a found record that has not been scored yet
    pub fn found(expiry: ExpiryState) -> Self {
        Self::Found {
            expiry,
            anomaly_score: None,
        }
    }

    /// Attach a raw anomaly score
    pub fn with_score(self, score: f64) -> Self {
        match self {
            Self::Found { expiry, .. } => Self::Found {
                expiry,
                anomaly_score: Some(score),
            },
            Self::NotFound => Self::NotFound,
        }
    }

    fn expiry(&self) -> Option<ExpiryState> {
        match self {
            Self::Found { expiry, .. } => Some(*expiry),
            Self::NotFound => None,
        }
    }

    fn anomaly_score(&self) -> Option<f64> {
        match self {
            Self::Found { anomaly_score, .. } => *anomaly_score,
            Self::NotFound => None,
        }
    }
}

/// Outcome of the decision table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub status: VerificationStatus,
    /// Confidence in [0, 1]
    pub confidence: f64,
    pub reason: String,
    /// Calibrated anomaly confidence, when the batch was scored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_confidence: Option<f64>,
}

/// Inputs visible to a rule
struct RuleInput<'a> {
    expiry: Option<ExpiryState>,
    anomaly_confidence: Option<f64>,
    config: &'a ClassifierConfig,
}

/// One row of the decision table
struct Rule {
    status: VerificationStatus,
    needs_score: bool,
    applies: fn(&RuleInput<'_>) -> bool,
    confidence: fn(&RuleInput<'_>) -> f64,
    reason: fn(&RuleInput<'_>) -> String,
}

/// Ordered decision table; order is significant
const RULES: [Rule; 4] = [
    Rule {
        status: VerificationStatus::Fake,
        needs_score: false,
        applies: |input| input.expiry.is_none(),
        confidence: |input| input.config.not_found_confidence,
        reason: |_| "Batch code not found in official database".to_string(),
    },
    Rule {
        status: VerificationStatus::Expired,
        needs_score: false,
        applies: |input| input.expiry.map(|e| e.is_expired).unwrap_or(false),
        confidence: |input| input.config.expired_confidence,
        reason: |input| {
            let days = input.expiry.map(|e| e.days_past()).unwrap_or(0);
            format!("Medicine expired {} ago", plural_days(days))
        },
    },
    Rule {
        status: VerificationStatus::Suspected,
        needs_score: true,
        applies: |input| {
            input
                .anomaly_confidence
                .map(|c| c > input.config.suspicion_threshold)
                .unwrap_or(false)
        },
        confidence: |input| input.anomaly_confidence.unwrap_or(0.0),
        reason: |input| {
            format!(
                "Unusual scan pattern detected by anomaly model (anomaly confidence: {:.1}%)",
                input.anomaly_confidence.unwrap_or(0.0) * 100.0
            )
        },
    },
    Rule {
        status: VerificationStatus::Valid,
        needs_score: true,
        applies: |_| true,
        confidence: |input| 1.0 - input.anomaly_confidence.unwrap_or(0.0),
        reason: |input| {
            let days = input.expiry.map(|e| e.days_remaining).unwrap_or(0);
            if days == 0 {
                "Medicine is authentic and valid (expires today)".to_string()
            } else {
                format!(
                    "Medicine is authentic and valid (expires in {})",
                    plural_days(days)
                )
            }
        },
    },
];

fn plural_days(days: i64) -> String {
    if days == 1 {
        "1 day".to_string()
    } else {
        format!("{} days", days)
    }
}

/// Decision table evaluator
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Calibrated anomaly confidence for a raw score
    pub fn anomaly_confidence(&self, raw_score: f64) -> f64 {
        self.config.calibration.confidence(raw_score)
    }

    fn input<'a>(&'a self, evidence: &Evidence) -> RuleInput<'a> {
        RuleInput {
            expiry: evidence.expiry(),
            anomaly_confidence: evidence.anomaly_score().map(|s| self.anomaly_confidence(s)),
            config: &self.config,
        }
    }

    /// Whether evaluation will reach a rule that needs an anomaly score
    pub fn requires_score(&self, evidence: &Evidence) -> bool {
        let input = self.input(evidence);
        for rule in RULES.iter() {
            if rule.needs_score && input.anomaly_confidence.is_none() {
                return true;
            }
            if (rule.applies)(&input) {
                return false;
            }
        }
        false
    }

    /// Evaluate the table; first matching row wins
    pub fn classify(&self, evidence: &Evidence) -> CoreResult<Classification> {
        let input = self.input(evidence);

        for rule in RULES.iter() {
            if rule.needs_score && input.anomaly_confidence.is_none() {
                return Err(CoreError::ScoreRequired {
                    rule: rule.status.as_str().to_string(),
                });
            }
            if (rule.applies)(&input) {
                return Ok(Classification {
                    status: rule.status,
                    confidence: (rule.confidence)(&input).clamp(0.0, 1.0),
                    reason: (rule.reason)(&input),
                    anomaly_confidence: input.anomaly_confidence,
                });
            }
        }

        // Valid is a catch-all, so the loop always returns
        Err(CoreError::ScoreRequired {
            rule: VerificationStatus::Valid.as_str().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_date(days: i64) -> ExpiryState {
        ExpiryState {
            days_remaining: days,
            is_expired: days < 0,
        }
    }

    #[test]
    fn test_not_found_is_fake() {
        let classifier = Classifier::default();
        assert!(!classifier.requires_score(&Evidence::NotFound));

        let result = classifier.classify(&Evidence::NotFound).unwrap();
        assert_eq!(result.status, VerificationStatus::Fake);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.reason, "Batch code not found in official database");
        assert!(result.anomaly_confidence.is_none());
    }

    #[test]
    fn test_expired_ignores_anomaly_score() {
        let classifier = Classifier::default();
        let evidence = Evidence::found(in_date(-12));
        assert!(!classifier.requires_score(&evidence));

        for score in [None, Some(-0.5), Some(0.5)] {
            let evidence = match score {
                Some(s) => evidence.with_score(s),
                None => evidence,
            };
            let result = classifier.classify(&evidence).unwrap();
            assert_eq!(result.status, VerificationStatus::Expired);
            assert_eq!(result.confidence, DEFAULT_EXPIRED_CONFIDENCE);
            assert_eq!(result.reason, "Medicine expired 12 days ago");
        }
    }

    #[test]
    fn test_expired_one_day_reason() {
        let result = Classifier::default()
            .classify(&Evidence::found(in_date(-1)))
            .unwrap();
        assert_eq!(result.reason, "Medicine expired 1 day ago");
    }

    #[test]
    fn test_in_date_requires_score() {
        let classifier = Classifier::default();
        let evidence = Evidence::found(in_date(30));
        assert!(classifier.requires_score(&evidence));
        assert!(matches!(
            classifier.classify(&evidence),
            Err(CoreError::ScoreRequired { .. })
        ));
        assert!(!classifier.requires_score(&evidence.with_score(-0.1)));
    }

    #[test]
    fn test_low_anomaly_is_valid() {
        let classifier = Classifier::default();
        let result = classifier
            .classify(&Evidence::found(in_date(540)).with_score(-0.1))
            .unwrap();
        assert_eq!(result.status, VerificationStatus::Valid);
        assert!((result.confidence - 0.95).abs() < 0.01);
        assert_eq!(result.reason, "Medicine is authentic and valid (expires in 540 days)");
    }

    #[test]
    fn test_high_anomaly_is_suspected() {
        let classifier = Classifier::default();
        let result = classifier
            .classify(&Evidence::found(in_date(200)).with_score(0.2))
            .unwrap();
        assert_eq!(result.status, VerificationStatus::Suspected);
        assert!(result.confidence > DEFAULT_SUSPICION_THRESHOLD);
        assert_eq!(result.anomaly_confidence, Some(result.confidence));
        assert!(result.reason.starts_with("Unusual scan pattern"));
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let classifier = Classifier::default();
        let at_threshold = classifier
            .config()
            .calibration
            .raw_for_confidence(DEFAULT_SUSPICION_THRESHOLD);

        // Just under the threshold stays Valid
        let below = classifier
            .classify(&Evidence::found(in_date(10)).with_score(at_threshold - 1e-6))
            .unwrap();
        assert_eq!(below.status, VerificationStatus::Valid);

        let above = classifier
            .classify(&Evidence::found(in_date(10)).with_score(at_threshold + 1e-6))
            .unwrap();
        assert_eq!(above.status, VerificationStatus::Suspected);
    }

    #[test]
    fn test_expiry_day_is_never_expired() {
        let classifier = Classifier::default();
        let low = classifier
            .classify(&Evidence::found(in_date(0)).with_score(-0.2))
            .unwrap();
        assert_eq!(low.status, VerificationStatus::Valid);
        assert_eq!(low.reason, "Medicine is authentic and valid (expires today)");

        let high = classifier
            .classify(&Evidence::found(in_date(0)).with_score(0.4))
            .unwrap();
        assert_eq!(high.status, VerificationStatus::Suspected);
    }

    #[test]
    fn test_confidence_always_bounded() {
        let classifier = Classifier::new(ClassifierConfig {
            expired_confidence: 1.5,
            not_found_confidence: -0.2,
            ..Default::default()
        });

        let mut evidence = vec![Evidence::NotFound, Evidence::found(in_date(-3))];
        for raw in [-10.0, -0.3, -0.01, 0.0, 0.01, 0.3, 10.0] {
            evidence.push(Evidence::found(in_date(5)).with_score(raw));
        }

        for e in evidence {
            let c = classifier.classify(&e).unwrap().confidence;
            assert!((0.0..=1.0).contains(&c), "confidence {} for {:?}", c, e);
        }
    }

    #[test]
    fn test_configurable_threshold() {
        let strict = Classifier::new(ClassifierConfig {
            suspicion_threshold: 0.3,
            ..Default::default()
        });
        // anomaly confidence at raw 0.0 is 0.5: suspected under 0.3, valid under 0.7
        let evidence = Evidence::found(in_date(100)).with_score(0.0);
        assert_eq!(
            strict.classify(&evidence).unwrap().status,
            VerificationStatus::Suspected
        );
        assert_eq!(
            Classifier::default().classify(&evidence).unwrap().status,
            VerificationStatus::Valid
        );
    }
}
