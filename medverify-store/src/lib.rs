//! MedVerify Store - Batch Registry and Verification Log
//!
//! Async storage seams used by the verification engine:
//!
//! - [`BatchRegistry`]: lookup and atomic scan recording
//! - [`VerificationLog`]: append-only event log
//!
//! Two backends are provided: [`MemoryRegistry`]/[`MemoryEventLog`] and the
//! persistent [`SledStore`].

pub mod error;
pub mod memory;
pub mod repo;
pub mod seed;
pub mod sled_store;

pub use error::{StoreError, StoreResult};
pub use memory::{MemoryEventLog, MemoryRegistry};
pub use repo::{
    BatchRegistry, LogQuery, VerificationLog, DEFAULT_LOCATION_HISTORY, DEFAULT_LOG_LIMIT,
    MAX_LOG_LIMIT,
};
pub use seed::{
    demo_records, seed_registry, CatalogueSeeder, SeedConfig, SeedReport, Shelf,
    DEFAULT_RNG_SEED, DEFAULT_SEED_COUNT, DEMO_EXPIRED_CODE, DEMO_SUSPICIOUS_CODE,
    DEMO_VALID_CODE,
};
pub use sled_store::SledStore;
