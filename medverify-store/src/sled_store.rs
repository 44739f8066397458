//! Sled Persistent Storage
//!
//! Embedded persistent registry and verification log.
//!
//! - `batches` tree: batch code → JSON `BatchRecord`; scans use
//!   `update_and_fetch`, an atomic compare-and-swap loop.
//! - `events` tree: `timestamp_micros (order-preserving BE) ‖ event id` →
//!   JSON `VerificationEvent`; keys sort chronologically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medverify_core::{BatchCode, BatchRecord, GeoPoint, VerificationEvent};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use crate::error::{StoreError, StoreResult};
use crate::repo::{BatchRegistry, LogQuery, VerificationLog, DEFAULT_LOCATION_HISTORY};

const BATCHES_TREE: &str = "batches";
const EVENTS_TREE: &str = "events";

/// Sled-backed store implementing both the registry and the log
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
    batches: sled::Tree,
    events: sled::Tree,
    location_history: usize,
}

impl SledStore {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)
            .map_err(|e| StoreError::database(format!("Failed to open sled db: {}", e)))?;
        Self::from_db(db)
    }

    /// Temporary database removed on drop
    pub fn temporary() -> StoreResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| StoreError::database(format!("Failed to open temporary db: {}", e)))?;
        Self::from_db(db)
    }

    fn from_db(db: sled::Db) -> StoreResult<Self> {
        let batches = db
            .open_tree(BATCHES_TREE)
            .map_err(|e| StoreError::database(format!("Failed to open batches tree: {}", e)))?;
        let events = db
            .open_tree(EVENTS_TREE)
            .map_err(|e| StoreError::database(format!("Failed to open events tree: {}", e)))?;

        Ok(Self {
            db,
            batches,
            events,
            location_history: DEFAULT_LOCATION_HISTORY,
        })
    }

    /// Set how many scan locations are retained per batch
    pub fn with_location_history(mut self, location_history: usize) -> Self {
        self.location_history = location_history;
        self
    }

    /// Flush to disk
    pub async fn flush(&self) -> StoreResult<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| StoreError::database(format!("Failed to flush db: {}", e)))?;
        Ok(())
    }

    fn serialize<T: Serialize>(value: &T) -> StoreResult<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn time_prefix(timestamp: &DateTime<Utc>) -> [u8; 8] {
        // Flip the sign bit so negative timestamps sort before positive ones
        let micros = timestamp.timestamp_micros() as u64 ^ (1 << 63);
        micros.to_be_bytes()
    }

    fn event_key(event: &VerificationEvent) -> Vec<u8> {
        let mut key = Self::time_prefix(&event.timestamp).to_vec();
        key.extend_from_slice(event.id.as_str().as_bytes());
        key
    }
}

#[async_trait]
impl BatchRegistry for SledStore {
    async fn lookup(&self, code: &BatchCode) -> StoreResult<Option<BatchRecord>> {
        match self
            .batches
            .get(code.as_str())
            .map_err(|e| StoreError::database(format!("Failed to get batch: {}", e)))?
        {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn record_scan(
        &self,
        code: &BatchCode,
        location: Option<GeoPoint>,
    ) -> StoreResult<Option<BatchRecord>> {
        let window = self.location_history;
        let mut failure: Option<StoreError> = None;

        // The closure may run several times under contention; only the
        // attempt that wins the CAS is persisted.
        let updated = self
            .batches
            .update_and_fetch(code.as_str(), |old| {
                failure = None;
                let old = old?;
                let mut record: BatchRecord = match Self::deserialize(old) {
                    Ok(record) => record,
                    Err(e) => {
                        failure = Some(e);
                        return Some(old.to_vec());
                    }
                };
                record.apply_scan(location, window);
                match Self::serialize(&record) {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        failure = Some(e);
                        Some(old.to_vec())
                    }
                }
            })
            .map_err(|e| StoreError::database(format!("Failed to record scan: {}", e)))?;

        if let Some(err) = failure {
            return Err(err);
        }

        match updated {
            Some(bytes) => Ok(Some(Self::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, record: BatchRecord) -> StoreResult<bool> {
        let value = Self::serialize(&record)?;
        let result = self
            .batches
            .compare_and_swap(record.code.as_str(), None as Option<&[u8]>, Some(value))
            .map_err(|e| StoreError::database(format!("Failed to insert batch: {}", e)))?;
        Ok(result.is_ok())
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.batches.len() as u64)
    }
}

#[async_trait]
impl VerificationLog for SledStore {
    async fn append(&self, event: VerificationEvent) -> StoreResult<()> {
        let key = Self::event_key(&event);
        let value = Self::serialize(&event)?;
        self.events
            .insert(key, value)
            .map_err(|e| StoreError::database(format!("Failed to append event: {}", e)))?;
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> StoreResult<Vec<VerificationEvent>> {
        query.validate()?;

        let iter = match &query.since {
            Some(since) => self.events.range(Self::time_prefix(since).to_vec()..),
            None => self.events.iter(),
        };

        let mut events = Vec::new();
        for item in iter.rev() {
            let (_, value) = item
                .map_err(|e| StoreError::database(format!("Failed to iterate events: {}", e)))?;
            let event: VerificationEvent = Self::deserialize(&value)?;
            if query.matches(&event) {
                events.push(event);
                if events.len() >= query.limit {
                    break;
                }
            }
        }
        Ok(events)
    }

    async fn all(&self) -> StoreResult<Vec<VerificationEvent>> {
        let mut events = Vec::with_capacity(self.events.len());
        for item in self.events.iter() {
            let (_, value) = item
                .map_err(|e| StoreError::database(format!("Failed to iterate events: {}", e)))?;
            events.push(Self::deserialize(&value)?);
        }
        Ok(events)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.events.len() as u64)
    }
}
