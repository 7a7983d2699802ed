//! Arrival-vs-schedule evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of comparing an arrival against its scheduled time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalEvaluation {
    /// Minutes after (positive) or before (negative) the scheduled time,
    /// rounded to the nearest minute.
    pub variance_minutes: i64,
    /// An arrival exactly on the scheduled minute is on time.
    pub is_late: bool,
}

/// Evaluate an arrival timestamp against a scheduled timestamp.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use fieldtrace::evaluate_arrival;
///
/// let scheduled = Utc.with_ymd_and_hms(2024, 6, 3, 14, 0, 0).unwrap();
/// let arrival = Utc.with_ymd_and_hms(2024, 6, 3, 14, 5, 0).unwrap();
///
/// let eval = evaluate_arrival(arrival, scheduled);
/// assert_eq!(eval.variance_minutes, 5);
/// assert!(eval.is_late);
/// ```
pub fn evaluate_arrival(arrival: DateTime<Utc>, scheduled: DateTime<Utc>) -> ArrivalEvaluation {
    let seconds = (arrival - scheduled).num_seconds();
    let variance_minutes = (seconds as f64 / 60.0).round() as i64;

    ArrivalEvaluation {
        variance_minutes,
        is_late: variance_minutes > 0,
    }
}
