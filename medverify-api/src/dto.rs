//! Data Transfer Objects
//!
//! Request and response bodies. Statuses travel as a closed enum internally;
//! the display label is rendered only here.

use chrono::{DateTime, NaiveDate, Utc};
use medverify_core::{DailyCount, GeoPoint, StatsSnapshot, VerificationEvent, VerificationStatus};
use medverify_engine::{BatchSummary, VerificationOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================
// Verification DTOs
// ============================================

/// Request to verify a batch code
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Batch code as printed on the packaging
    #[serde(default)]
    pub code: Option<String>,
    /// Scan latitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Scan longitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// Batch details for a registered code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchInfoDto {
    pub name: String,
    pub manufacturer: String,
    pub expiry_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturing_date: Option<NaiveDate>,
    pub scan_count: u64,
}

impl From<BatchSummary> for BatchInfoDto {
    fn from(batch: BatchSummary) -> Self {
        Self {
            name: batch.medicine_name,
            manufacturer: batch.manufacturer,
            expiry_date: batch.expiry_date,
            manufacturing_date: batch.manufacturing_date,
            scan_count: batch.scan_count,
        }
    }
}

/// Verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Display label, e.g. "Valid ✅"
    pub status: String,
    /// Machine label
    pub status_code: VerificationStatus,
    pub reason: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_info: Option<BatchInfoDto>,
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
}

impl From<VerificationOutcome> for VerifyResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        Self {
            status: outcome.status.display_label().to_string(),
            status_code: outcome.status,
            reason: outcome.reason,
            confidence: outcome.confidence,
            batch_info: outcome.batch.map(BatchInfoDto::from),
            event_id: outcome.event_id.0,
            timestamp: outcome.timestamp,
        }
    }
}

// ============================================
// Admin DTOs
// ============================================

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Admin login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Query parameters for the log listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
    pub status: Option<String>,
}

/// Scan location
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationDto {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoPoint> for LocationDto {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.latitude,
            lng: point.longitude,
        }
    }
}

/// One verification log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntryDto {
    pub id: String,
    pub batch_code: String,
    pub status: VerificationStatus,
    pub confidence: f64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationDto>,
    pub timestamp: DateTime<Utc>,
}

impl From<VerificationEvent> for LogEntryDto {
    fn from(event: VerificationEvent) -> Self {
        Self {
            id: event.id.0,
            batch_code: event.batch_code,
            status: event.status,
            confidence: event.confidence,
            reason: event.reason,
            location: event.location.map(LocationDto::from),
            timestamp: event.timestamp,
        }
    }
}

/// Log listing, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: Vec<LogEntryDto>,
    pub count: usize,
}

/// Query parameters for stats
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsQuery {
    /// Trailing window for daily counts
    pub days: Option<u32>,
}

/// Dashboard statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_verifications: u64,
    pub total_batches: u64,
    /// Every status present, zero-filled
    pub status_counts: BTreeMap<VerificationStatus, u64>,
    /// Ascending by date
    pub daily_counts: Vec<DailyCount>,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(snapshot: StatsSnapshot) -> Self {
        Self {
            total_verifications: snapshot.total_count,
            total_batches: snapshot.total_batches,
            status_counts: snapshot.counts_by_status,
            daily_counts: snapshot.daily_counts,
        }
    }
}

// ============================================
// Service DTOs
// ============================================

/// Service root response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub message: String,
}

/// Component health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub model_version: String,
    pub components: Vec<ComponentHealth>,
}
