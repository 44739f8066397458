//! In-Memory Storage
//!
//! Thread-safe registry and log guarded by `RwLock`; used for tests,
//! development and single-process deployments.

use async_trait::async_trait;
use medverify_core::{BatchCode, BatchRecord, GeoPoint, VerificationEvent};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::repo::{BatchRegistry, LogQuery, VerificationLog, DEFAULT_LOCATION_HISTORY};

/// In-memory batch registry
#[derive(Debug)]
pub struct MemoryRegistry {
    records: RwLock<HashMap<BatchCode, BatchRecord>>,
    location_history: usize,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            location_history: DEFAULT_LOCATION_HISTORY,
        }
    }

    /// Set how many scan locations are retained per batch
    pub fn with_location_history(mut self, location_history: usize) -> Self {
        self.location_history = location_history;
        self
    }

    /// Build a registry pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = BatchRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| (r.code.clone(), r))
            .collect::<HashMap<_, _>>();
        Self {
            records: RwLock::new(map),
            location_history: DEFAULT_LOCATION_HISTORY,
        }
    }
}

#[async_trait]
impl BatchRegistry for MemoryRegistry {
    async fn lookup(&self, code: &BatchCode) -> StoreResult<Option<BatchRecord>> {
        let records = self.records.read().await;
        Ok(records.get(code).cloned())
    }

    async fn record_scan(
        &self,
        code: &BatchCode,
        location: Option<GeoPoint>,
    ) -> StoreResult<Option<BatchRecord>> {
        // Increment under the write lock so concurrent scans serialize
        let mut records = self.records.write().await;
        Ok(records.get_mut(code).map(|record| {
            record.apply_scan(location, self.location_history);
            record.clone()
        }))
    }

    async fn insert(&self, record: BatchRecord) -> StoreResult<bool> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.code) {
            return Ok(false);
        }
        records.insert(record.code.clone(), record);
        Ok(true)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.records.read().await.len() as u64)
    }
}

/// In-memory verification log
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<VerificationEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VerificationLog for MemoryEventLog {
    async fn append(&self, event: VerificationEvent) -> StoreResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }

    async fn query(&self, query: &LogQuery) -> StoreResult<Vec<VerificationEvent>> {
        query.validate()?;
        let events = self.events.read().await;
        let mut matching: Vec<VerificationEvent> =
            events.iter().filter(|e| query.matches(e)).cloned().collect();
        // Appends may complete out of timestamp order under concurrency
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(query.limit);
        Ok(matching)
    }

    async fn all(&self) -> StoreResult<Vec<VerificationEvent>> {
        let mut events = self.events.read().await.clone();
        events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(events)
    }

    async fn count(&self) -> StoreResult<u64> {
        Ok(self.events.read().await.len() as u64)
    }
}
