//! Domain Types
//!
//! Batch records, verification events and the closed status enumeration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Batch code printed on the packaging, normalized to upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchCode(String);

impl BatchCode {
    /// Parse and normalize a batch code (trimmed, upper-cased)
    ///
    /// Only a blank code is rejected; any other text is a lookup key, and an
    /// unregistered one classifies as Fake.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() {
            return Err(CoreError::invalid_code("batch code is empty"));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Geographic point of a scan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a validated point
    pub fn new(latitude: f64, longitude: f64) -> CoreResult<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(CoreError::InvalidLocation {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Build a point from optional request coordinates.
    ///
    /// A location is only recorded when both coordinates are present.
    pub fn from_optional(lat: Option<f64>, lng: Option<f64>) -> CoreResult<Option<Self>> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Self::new(lat, lng).map(Some),
            _ => Ok(None),
        }
    }
}

/// Registered medicine batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRecord {
    /// Unique batch code
    pub code: BatchCode,
    /// Medicine name
    pub medicine_name: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Manufacturer reliability in [0, 1]
    pub manufacturer_reliability: f64,
    /// Expiry date
    pub expiry_date: NaiveDate,
    /// Manufacturing date, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturing_date: Option<NaiveDate>,
    /// Number of verifications of this code
    pub scan_count: u64,
    /// Most recent scan locations, oldest first
    #[serde(default)]
    pub scan_locations: Vec<GeoPoint>,
    /// Registration time
    pub created_at: DateTime<Utc>,
}

impl BatchRecord {
    /// Create a fresh record with no scans
    pub fn new(
        code: BatchCode,
        medicine_name: impl Into<String>,
        manufacturer: impl Into<String>,
        manufacturer_reliability: f64,
        expiry_date: NaiveDate,
    ) -> Self {
        Self {
            code,
            medicine_name: medicine_name.into(),
            manufacturer: manufacturer.into(),
            manufacturer_reliability: manufacturer_reliability.clamp(0.0, 1.0),
            expiry_date,
            manufacturing_date: None,
            scan_count: 0,
            scan_locations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the manufacturing date
    pub fn with_manufacturing_date(mut self, date: NaiveDate) -> Self {
        self.manufacturing_date = Some(date);
        self
    }

    /// Set the initial scan count
    pub fn with_scan_count(mut self, scan_count: u64) -> Self {
        self.scan_count = scan_count;
        self
    }

    /// Set the initial scan locations
    pub fn with_scan_locations(mut self, locations: Vec<GeoPoint>) -> Self {
        self.scan_locations = locations;
        self
    }

    /// Apply one scan: +1 and optionally remember the location.
    ///
    /// Keeps at most `location_window` locations.
    pub fn apply_scan(&mut self, location: Option<GeoPoint>, location_window: usize) {
        self.scan_count = self.scan_count.saturating_add(1);
        if let Some(point) = location {
            self.scan_locations.push(point);
            if self.scan_locations.len() > location_window {
                let excess = self.scan_locations.len() - location_window;
                self.scan_locations.drain(..excess);
            }
        }
    }
}

/// Verification outcome; closed set of four domain states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    /// Registered, in date, ordinary scan pattern
    Valid,
    /// Registered but past expiry
    Expired,
    /// Registered, in date, anomalous scan pattern
    Suspected,
    /// Not present in the registry
    Fake,
}

impl VerificationStatus {
    /// All statuses, in display order
    pub const ALL: [VerificationStatus; 4] = [
        VerificationStatus::Valid,
        VerificationStatus::Expired,
        VerificationStatus::Suspected,
        VerificationStatus::Fake,
    ];

    /// Machine label
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Suspected => "suspected",
            Self::Fake => "fake",
        }
    }

    /// Display label used by the consumer-facing UI
    pub fn display_label(&self) -> &'static str {
        match self {
            Self::Valid => "Valid ✅",
            Self::Expired => "Expired ⚠️",
            Self::Suspected => "Suspected Counterfeit 🤔",
            Self::Fake => "Fake ❌",
        }
    }

    /// Parse from the machine label
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "valid" => Some(Self::Valid),
            "expired" => Some(Self::Expired),
            "suspected" => Some(Self::Suspected),
            "fake" => Some(Self::Fake),
            _ => None,
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Verification event identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub String);

impl EventId {
    /// Generate a new random id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Immutable record of one verification attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationEvent {
    /// Event id
    pub id: EventId,
    /// Submitted code (back-reference, may not exist in the registry)
    pub batch_code: String,
    /// Outcome
    pub status: VerificationStatus,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Human readable reason
    pub reason: String,
    /// Scan location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    /// Completion time
    pub timestamp: DateTime<Utc>,
}

impl VerificationEvent {
    /// Create an event stamped with the current time
    pub fn new(
        batch_code: impl Into<String>,
        status: VerificationStatus,
        confidence: f64,
        reason: impl Into<String>,
        location: Option<GeoPoint>,
    ) -> Self {
        Self {
            id: EventId::generate(),
            batch_code: batch_code.into(),
            status,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            location,
            timestamp: Utc::now(),
        }
    }

    /// Override the timestamp (imports and fixtures)
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}
