//! MedVerify Engine - Verification Orchestration
//!
//! Wires the batch registry, anomaly scorer, decision table and verification
//! log into a single [`VerificationEngine`].
//!
//! # Modules
//!
//! - [`engine`] - Request orchestration with timeouts
//! - [`logger`] - Non-fatal verification logging
//! - [`config`] - Engine configuration
//! - [`error`] - Error types

pub mod config;
pub mod engine;
pub mod error;
pub mod logger;

pub use config::{EngineConfig, DEFAULT_STATS_DAYS};
pub use engine::{
    BatchSummary, ComponentHealth, EngineHealth, VerificationEngine, VerificationOutcome,
    VerificationRequest,
};
pub use error::{EngineError, EngineResult};
pub use logger::VerificationLogger;
