//! Repository Traits
//!
//! Storage seams for the batch registry and the verification log. Both are
//! shared mutable state; implementations must make `record_scan` and `append`
//! atomic so concurrent requests never lose an update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use medverify_core::{BatchCode, BatchRecord, GeoPoint, VerificationEvent, VerificationStatus};

use crate::error::{StoreError, StoreResult};

/// Default number of log entries returned
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Hard cap on log entries returned
pub const MAX_LOG_LIMIT: usize = 1000;

/// Default number of scan locations kept per batch
pub const DEFAULT_LOCATION_HISTORY: usize = 50;

/// Batch registry
#[async_trait]
pub trait BatchRegistry: Send + Sync {
    /// Look up a batch by normalized code
    async fn lookup(&self, code: &BatchCode) -> StoreResult<Option<BatchRecord>>;

    /// Atomically add one scan (and the location, if any).
    ///
    /// Returns the record as it is after the increment, or `None` when the
    /// code is not registered (no-op).
    async fn record_scan(
        &self,
        code: &BatchCode,
        location: Option<GeoPoint>,
    ) -> StoreResult<Option<BatchRecord>>;

    /// Register a batch; returns false if the code already exists
    async fn insert(&self, record: BatchRecord) -> StoreResult<bool>;

    /// Number of registered batches
    async fn count(&self) -> StoreResult<u64>;

    /// Backend reachability check
    async fn health_check(&self) -> StoreResult<()> {
        self.count().await.map(|_| ())
    }
}

/// Log query
#[derive(Debug, Clone, PartialEq)]
pub struct LogQuery {
    /// Maximum number of events
    pub limit: usize,
    /// Only this status
    pub status: Option<VerificationStatus>,
    /// Only events at or after this time
    pub since: Option<DateTime<Utc>>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOG_LIMIT,
            status: None,
            since: None,
        }
    }
}

impl LogQuery {
    /// Query for the newest `limit` events
    pub fn recent(limit: usize) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Restrict to one status
    pub fn with_status(mut self, status: VerificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restrict to events at or after `since`
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Validate limits
    pub fn validate(&self) -> StoreResult<()> {
        if self.limit == 0 {
            return Err(StoreError::invalid_query("limit must be at least 1"));
        }
        if self.limit > MAX_LOG_LIMIT {
            return Err(StoreError::invalid_query(format!(
                "limit must not exceed {}",
                MAX_LOG_LIMIT
            )));
        }
        Ok(())
    }

    /// Whether an event passes the status and time filters
    pub fn matches(&self, event: &VerificationEvent) -> bool {
        self.status.map(|s| s == event.status).unwrap_or(true)
            && self.since.map(|t| event.timestamp >= t).unwrap_or(true)
    }
}

/// Append-only verification log
#[async_trait]
pub trait VerificationLog: Send + Sync {
    /// Append one event
    async fn append(&self, event: VerificationEvent) -> StoreResult<()>;

    /// Matching events, newest first
    async fn query(&self, query: &LogQuery) -> StoreResult<Vec<VerificationEvent>>;

    /// Every event, oldest first
    async fn all(&self) -> StoreResult<Vec<VerificationEvent>>;

    /// Number of events
    async fn count(&self) -> StoreResult<u64>;
}
