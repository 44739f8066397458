//! Expiry Evaluator
//!
//! Calendar-day comparison between a batch expiry date and "now".

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Result of an expiry evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryState {
    /// Whole days until expiry; negative once past
    pub days_remaining: i64,
    /// True iff `days_remaining < 0`
    pub is_expired: bool,
}

impl ExpiryState {
    /// Days past expiry (0 while still in date)
    pub fn days_past(&self) -> i64 {
        if self.is_expired {
            -self.days_remaining
        } else {
            0
        }
    }
}

/// Evaluate expiry of `expiry_date` as seen at `now` (UTC calendar day).
///
/// A batch on its expiry day still has `days_remaining == 0` and is not expired.
pub fn evaluate_expiry(expiry_date: NaiveDate, now: DateTime<Utc>) -> ExpiryState {
    let days_remaining = (expiry_date - now.date_naive()).num_days();
    ExpiryState {
        days_remaining,
        is_expired: days_remaining < 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_far_future_expiry() {
        let expiry = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        let state = evaluate_expiry(expiry, noon(2026, 1, 1));
        assert_eq!(state.days_remaining, 365);
        assert!(!state.is_expired);
        assert_eq!(state.days_past(), 0);
    }

    #[test]
    fn test_expiry_day_is_not_expired() {
        let expiry = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let state = evaluate_expiry(expiry, noon(2026, 3, 15));
        assert_eq!(state.days_remaining, 0);
        assert!(!state.is_expired);

        // Still not expired in the last second of the day
        let late = Utc.with_ymd_and_hms(2026, 3, 15, 23, 59, 59).unwrap();
        assert!(!evaluate_expiry(expiry, late).is_expired);
    }

    #[test]
    fn test_expired_yesterday() {
        let now = noon(2026, 3, 15);
        let yesterday = (now - Duration::days(1)).date_naive();
        let state = evaluate_expiry(yesterday, now);
        assert_eq!(state.days_remaining, -1);
        assert!(state.is_expired);
        assert_eq!(state.days_past(), 1);
    }

    #[test]
    fn test_deterministic() {
        let expiry = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let now = noon(2026, 3, 15);
        assert_eq!(evaluate_expiry(expiry, now), evaluate_expiry(expiry, now));
    }
}
