//! Verification Logger
//!
//! Appends verification events to the log. A failed or timed-out append is
//! reported through tracing and the `medverify_log_failures_total` counter;
//! it never fails the verification that produced the event.

use medverify_core::VerificationEvent;
use medverify_store::VerificationLog;
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Non-fatal event logger
#[derive(Clone)]
pub struct VerificationLogger {
    log: Arc<dyn VerificationLog>,
    timeout: Duration,
}

impl VerificationLogger {
    pub fn new(log: Arc<dyn VerificationLog>, timeout: Duration) -> Self {
        Self { log, timeout }
    }

    /// Underlying log, for read paths
    pub fn log(&self) -> &Arc<dyn VerificationLog> {
        &self.log
    }

    /// Append one event; returns whether it was persisted
    pub async fn record(&self, event: VerificationEvent) -> bool {
        let event_id = event.id.clone();
        let batch_code = event.batch_code.clone();

        let failure = match tokio::time::timeout(self.timeout, self.log.append(event)).await {
            Ok(Ok(())) => {
                debug!(event_id = %event_id.as_str(), batch_code = %batch_code, "Verification logged");
                return true;
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("append timed out after {}ms", self.timeout.as_millis()),
        };

        error!(
            event_id = %event_id.as_str(),
            batch_code = %batch_code,
            error = %failure,
            "Failed to log verification"
        );
        counter!("medverify_log_failures_total").increment(1);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use medverify_core::VerificationStatus;
    use medverify_store::{LogQuery, MemoryEventLog, StoreError, StoreResult};

    struct BrokenLog;

    #[async_trait]
    impl VerificationLog for BrokenLog {
        async fn append(&self, _event: VerificationEvent) -> StoreResult<()> {
            Err(StoreError::database("disk full"))
        }

        async fn query(&self, _query: &LogQuery) -> StoreResult<Vec<VerificationEvent>> {
            Ok(Vec::new())
        }

        async fn all(&self) -> StoreResult<Vec<VerificationEvent>> {
            Ok(Vec::new())
        }

        async fn count(&self) -> StoreResult<u64> {
            Ok(0)
        }
    }

    fn event() -> VerificationEvent {
        VerificationEvent::new("MED597233X", VerificationStatus::Valid, 0.95, "ok", None)
    }

    #[tokio::test]
    async fn test_record_appends() {
        let log = Arc::new(MemoryEventLog::new());
        let logger = VerificationLogger::new(log.clone(), Duration::from_secs(1));

        assert!(logger.record(event()).await);
        assert_eq!(log.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_failure_is_reported_not_raised() {
        let logger = VerificationLogger::new(Arc::new(BrokenLog), Duration::from_secs(1));
        assert!(!logger.record(event()).await);
    }
}
