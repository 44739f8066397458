//! Stats Aggregator
//!
//! Read-side summary of verification events for the dashboard. Recomputed on
//! demand; never persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{VerificationEvent, VerificationStatus};

/// Verifications on one calendar day (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Dashboard summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Number of events summarized
    pub total_count: u64,
    /// Events per status; every status present
    pub counts_by_status: BTreeMap<VerificationStatus, u64>,
    /// Events per day, ascending
    pub daily_counts: Vec<DailyCount>,
    /// Registered batches
    pub total_batches: u64,
}

impl StatsSnapshot {
    /// All-zero snapshot
    pub fn empty(total_batches: u64) -> Self {
        Self {
            total_count: 0,
            counts_by_status: VerificationStatus::ALL.iter().map(|s| (*s, 0)).collect(),
            daily_counts: Vec::new(),
            total_batches,
        }
    }

    /// Count for one status
    pub fn count(&self, status: VerificationStatus) -> u64 {
        self.counts_by_status.get(&status).copied().unwrap_or(0)
    }

    /// Keep only daily buckets on or after `since`; totals are unchanged
    pub fn with_daily_since(mut self, since: NaiveDate) -> Self {
        self.daily_counts.retain(|d| d.date >= since);
        self
    }
}

/// Summarize events
pub fn summarize(events: &[VerificationEvent], total_batches: u64) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot::empty(total_batches);
    let mut daily: BTreeMap<NaiveDate, u64> = BTreeMap::new();

    for event in events {
        *snapshot.counts_by_status.entry(event.status).or_insert(0) += 1;
        *daily.entry(event.timestamp.date_naive()).or_insert(0) += 1;
    }

    snapshot.total_count = events.len() as u64;
    snapshot.daily_counts = daily
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect();

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(status: VerificationStatus, day: u32, hour: u32) -> VerificationEvent {
        VerificationEvent::new("MED100000A", status, 0.9, "test", None)
            .at(Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_empty_summary() {
        let snapshot = summarize(&[], 0);
        assert_eq!(snapshot.total_count, 0);
        assert_eq!(snapshot.total_batches, 0);
        assert!(snapshot.daily_counts.is_empty());
        assert_eq!(snapshot.counts_by_status.len(), 4);
        assert!(snapshot.counts_by_status.values().all(|c| *c == 0));
    }

    #[test]
    fn test_counts_sum_to_total() {
        let events = vec![
            event(VerificationStatus::Valid, 1, 9),
            event(VerificationStatus::Valid, 1, 10),
            event(VerificationStatus::Fake, 2, 11),
            event(VerificationStatus::Expired, 3, 12),
            event(VerificationStatus::Valid, 3, 13),
        ];
        let snapshot = summarize(&events, 50);

        assert_eq!(snapshot.total_count, 5);
        assert_eq!(snapshot.count(VerificationStatus::Valid), 3);
        assert_eq!(snapshot.count(VerificationStatus::Suspected), 0);
        assert_eq!(
            snapshot.counts_by_status.values().sum::<u64>(),
            snapshot.total_count
        );
        assert_eq!(snapshot.total_batches, 50);
    }

    #[test]
    fn test_daily_buckets_ascending() {
        let events = vec![
            event(VerificationStatus::Valid, 5, 9),
            event(VerificationStatus::Fake, 2, 23),
            event(VerificationStatus::Valid, 5, 1),
            event(VerificationStatus::Suspected, 3, 0),
        ];
        let snapshot = summarize(&events, 0);
        let days: Vec<(u32, u64)> = snapshot
            .daily_counts
            .iter()
            .map(|d| (chrono::Datelike::day(&d.date), d.count))
            .collect();
        assert_eq!(days, vec![(2, 1), (3, 1), (5, 2)]);
        assert_eq!(
            snapshot.daily_counts.iter().map(|d| d.count).sum::<u64>(),
            snapshot.total_count
        );
    }

    #[test]
    fn test_daily_window_keeps_totals() {
        let events = vec![
            event(VerificationStatus::Valid, 1, 9),
            event(VerificationStatus::Valid, 8, 9),
        ];
        let since = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let snapshot = summarize(&events, 0).with_daily_since(since);
        assert_eq!(snapshot.daily_counts.len(), 1);
        assert_eq!(snapshot.total_count, 2);
    }

    #[test]
    fn test_serialized_status_keys() {
        let json = serde_json::to_value(summarize(&[], 0)).unwrap();
        assert_eq!(json["counts_by_status"]["suspected"], 0);
        assert_eq!(json["counts_by_status"]["fake"], 0);
    }
}
