//! Verification Engine
//!
//! Orchestrates one verification request:
//! lookup → record scan → expiry → (features → score) → decision table → log.
//!
//! Registry calls and scorer invocations are bounded by timeouts. Infrastructure
//! failures surface as [`EngineError`] and never as a verification status.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, Utc};
use medverify_core::{
    evaluate_expiry, summarize, AnomalyScorer, BatchCode, BatchRecord, Classification, Classifier,
    Evidence, EventId, FeatureExtractor, FeatureVector, GeoPoint, StatsSnapshot,
    VerificationEvent, VerificationStatus,
};
use medverify_store::{BatchRegistry, LogQuery, StoreError, StoreResult, VerificationLog};
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::logger::VerificationLogger;

/// Verification request
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationRequest {
    /// Raw code as submitted
    pub code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl VerificationRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            latitude: None,
            longitude: None,
        }
    }

    /// Attach the scan location
    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }
}

/// Batch details returned for found codes
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub code: BatchCode,
    pub medicine_name: String,
    pub manufacturer: String,
    pub expiry_date: NaiveDate,
    pub manufacturing_date: Option<NaiveDate>,
    /// Scan count including this verification
    pub scan_count: u64,
}

impl From<&BatchRecord> for BatchSummary {
    fn from(record: &BatchRecord) -> Self {
        Self {
            code: record.code.clone(),
            medicine_name: record.medicine_name.clone(),
            manufacturer: record.manufacturer.clone(),
            expiry_date: record.expiry_date,
            manufacturing_date: record.manufacturing_date,
            scan_count: record.scan_count,
        }
    }
}

/// Verification result
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationOutcome {
    pub event_id: EventId,
    /// Normalized batch code
    pub batch_code: String,
    pub status: VerificationStatus,
    pub confidence: f64,
    pub reason: String,
    /// Calibrated anomaly confidence, when the batch was scored
    pub anomaly_confidence: Option<f64>,
    /// Present only when the code is registered
    pub batch: Option<BatchSummary>,
    pub timestamp: DateTime<Utc>,
    /// Whether the event reached the log
    pub logged: bool,
}

/// Health of one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHealth {
    pub healthy: bool,
    pub message: Option<String>,
}

impl ComponentHealth {
    fn ok() -> Self {
        Self {
            healthy: true,
            message: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
        }
    }
}

/// Engine dependency health
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineHealth {
    pub registry: ComponentHealth,
    pub log: ComponentHealth,
    pub scorer: ComponentHealth,
    pub model_version: String,
}

impl EngineHealth {
    pub fn is_healthy(&self) -> bool {
        self.registry.healthy && self.log.healthy && self.scorer.healthy
    }
}

/// Verification decision engine
#[derive(Clone)]
pub struct VerificationEngine {
    registry: Arc<dyn BatchRegistry>,
    logger: VerificationLogger,
    scorer: Arc<dyn AnomalyScorer>,
    classifier: Classifier,
    extractor: FeatureExtractor,
    config: EngineConfig,
}

impl VerificationEngine {
    pub fn new(
        registry: Arc<dyn BatchRegistry>,
        log: Arc<dyn VerificationLog>,
        scorer: Arc<dyn AnomalyScorer>,
        config: EngineConfig,
    ) -> Self {
        Self {
            registry,
            logger: VerificationLogger::new(log, config.log_timeout),
            scorer,
            classifier: Classifier::new(config.classifier),
            extractor: FeatureExtractor::new(config.features.clone()),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<dyn BatchRegistry> {
        &self.registry
    }

    pub fn scorer(&self) -> &Arc<dyn AnomalyScorer> {
        &self.scorer
    }

    /// Verify a batch code against the current date
    pub async fn verify(&self, request: VerificationRequest) -> EngineResult<VerificationOutcome> {
        self.verify_at(request, Utc::now()).await
    }

    /// Verify a batch code, evaluating expiry against `now`
    pub async fn verify_at(
        &self,
        request: VerificationRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<VerificationOutcome> {
        let started = Instant::now();
        let result = self.decide(&request, now).await;

        match &result {
            Ok(outcome) => {
                counter!("medverify_verifications_total", "status" => outcome.status.as_str())
                    .increment(1);
                info!(
                    batch_code = %outcome.batch_code,
                    status = %outcome.status,
                    confidence = outcome.confidence,
                    logged = outcome.logged,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Verification completed"
                );
            }
            Err(e) => {
                counter!("medverify_errors_total", "type" => e.kind()).increment(1);
                warn!(
                    batch_code = %request.code,
                    error = %e,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Verification failed"
                );
            }
        }

        result
    }

    async fn decide(
        &self,
        request: &VerificationRequest,
        now: DateTime<Utc>,
    ) -> EngineResult<VerificationOutcome> {
        let code = BatchCode::parse(&request.code)?;
        let location = GeoPoint::from_optional(request.latitude, request.longitude)?;

        let found = self
            .registry_call("lookup", self.registry.lookup(&code))
            .await?;

        let (classification, batch) = match found {
            None => (self.classifier.classify(&Evidence::NotFound)?, None),
            Some(_) => {
                let scanned = self
                    .registry_call("record_scan", self.registry.record_scan(&code, location))
                    .await?;
                match scanned {
                    Some(record) => self.classify_found(&record, now).await?,
                    // Removed between lookup and scan
                    None => (self.classifier.classify(&Evidence::NotFound)?, None),
                }
            }
        };

        let event = VerificationEvent::new(
            code.as_str(),
            classification.status,
            classification.confidence,
            classification.reason.clone(),
            location,
        );
        let event_id = event.id.clone();
        let timestamp = event.timestamp;
        let logged = self.logger.record(event).await;

        Ok(VerificationOutcome {
            event_id,
            batch_code: code.as_str().to_string(),
            status: classification.status,
            confidence: classification.confidence,
            reason: classification.reason,
            anomaly_confidence: classification.anomaly_confidence,
            batch,
            timestamp,
            logged,
        })
    }

    async fn classify_found(
        &self,
        record: &BatchRecord,
        now: DateTime<Utc>,
    ) -> EngineResult<(Classification, Option<BatchSummary>)> {
        let expiry = evaluate_expiry(record.expiry_date, now);
        let mut evidence = Evidence::found(expiry);

        if self.classifier.requires_score(&evidence) {
            let features = self.extractor.extract(record, &expiry);
            let raw = self.score(features).await?;
            evidence = evidence.with_score(raw);
        }

        let classification = self.classifier.classify(&evidence)?;
        Ok((classification, Some(BatchSummary::from(record))))
    }

    async fn score(&self, features: FeatureVector) -> EngineResult<f64> {
        let scorer = Arc::clone(&self.scorer);
        let task = tokio::task::spawn_blocking(move || scorer.score(&features));

        match tokio::time::timeout(self.config.scorer_timeout, task).await {
            Ok(Ok(Ok(raw))) => Ok(raw),
            Ok(Ok(Err(e))) => Err(EngineError::scorer_unavailable(e.to_string())),
            Ok(Err(e)) => Err(EngineError::scorer_unavailable(format!(
                "scorer task failed: {}",
                e
            ))),
            Err(_) => Err(EngineError::scorer_unavailable(format!(
                "scoring timed out after {}ms",
                self.config.scorer_timeout.as_millis()
            ))),
        }
    }

    async fn registry_call<T, F>(&self, operation: &str, call: F) -> EngineResult<T>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.config.registry_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(EngineError::lookup_unavailable(format!(
                "{} failed: {}",
                operation, e
            ))),
            Err(_) => Err(EngineError::lookup_unavailable(format!(
                "{} timed out after {}ms",
                operation,
                self.config.registry_timeout.as_millis()
            ))),
        }
    }

    /// Dashboard summary; `days` limits the daily buckets to a trailing window
    pub async fn stats(&self, days: Option<u32>, now: DateTime<Utc>) -> EngineResult<StatsSnapshot> {
        if days == Some(0) {
            return Err(EngineError::invalid_input(
                "MV-INPUT-003",
                "days must be at least 1",
            ));
        }

        let events = self
            .logger
            .log()
            .all()
            .await
            .map_err(log_unavailable)?;
        let total_batches = self.registry_call("count", self.registry.count()).await?;

        let snapshot = summarize(&events, total_batches);
        Ok(match days {
            Some(days) => {
                let since = now.date_naive() - ChronoDuration::days(i64::from(days) - 1);
                snapshot.with_daily_since(since)
            }
            None => snapshot,
        })
    }

    /// Recent events, newest first
    pub async fn recent_events(&self, query: &LogQuery) -> EngineResult<Vec<VerificationEvent>> {
        self.logger.log().query(query).await.map_err(|e| match e {
            StoreError::InvalidQuery(_) => EngineError::from(e),
            other => log_unavailable(other),
        })
    }

    /// Dependency health
    pub async fn health(&self) -> EngineHealth {
        let registry = match self.registry_call("health_check", self.registry.health_check()).await {
            Ok(()) => ComponentHealth::ok(),
            Err(e) => ComponentHealth::failed(e.to_string()),
        };
        let log = match self.logger.log().count().await {
            Ok(_) => ComponentHealth::ok(),
            Err(e) => ComponentHealth::failed(e.to_string()),
        };
        let scorer = if self.scorer.is_ready() {
            ComponentHealth::ok()
        } else {
            ComponentHealth::failed("anomaly model not loaded")
        };

        EngineHealth {
            registry,
            log,
            scorer,
            model_version: self.scorer.model_version().to_string(),
        }
    }
}

fn log_unavailable(err: StoreError) -> EngineError {
    EngineError::LogUnavailable {
        reason: err.to_string(),
    }
}
