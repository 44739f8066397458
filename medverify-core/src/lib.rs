//! MedVerify Core - Verification Decision Domain
//!
//! Pure domain logic for deciding whether a medicine batch code is authentic,
//! expired, or suspected counterfeit.
//!
//! # Decision Flow
//!
//! ```text
//! code ──► registry lookup ──► found? ──no──► Fake
//!                                 │
//!                                yes
//!                                 ▼
//!                          expiry evaluator ──expired──► Expired
//!                                 │
//!                                 ▼
//!                        feature extraction
//!                                 ▼
//!                  scaler ──► isolation forest ──► raw score
//!                                 ▼
//!                        logistic calibration
//!                                 ▼
//!                    decision table ──► Suspected | Valid
//! ```
//!
//! Everything in this crate is synchronous and side-effect free; storage and
//! orchestration live in `medverify-store` and `medverify-engine`.

pub mod classify;
pub mod error;
pub mod expiry;
pub mod features;
pub mod scoring;
pub mod stats;
pub mod types;

pub use classify::{Classification, Classifier, ClassifierConfig, Evidence};
pub use error::{CoreError, CoreResult};
pub use expiry::{evaluate_expiry, ExpiryState};
pub use features::{FeatureConfig, FeatureExtractor, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use scoring::{
    AnomalyScorer, ConfidenceCalibration, FixedScorer, IsolationForest, ModelScorer,
    StandardScaler, UnavailableScorer,
};
pub use stats::{summarize, DailyCount, StatsSnapshot};
pub use types::{
    BatchCode, BatchRecord, EventId, GeoPoint, VerificationEvent, VerificationStatus,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
