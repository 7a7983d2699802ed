//! Job-to-job transit-time anomaly detection.
//!
//! Post-pass over a built event stream: for each `left_job` → next
//! `arrived_job` span, compares expected direct-route drive time against the
//! actual on-the-clock transit time net of meal breaks. Expected drive
//! minutes are derived externally (straight-line distance at an assumed
//! average speed) and supplied as an input. Findings are advisory, not hard
//! errors.

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{EngineConfig, TimelineEvent};

/// A drive between two consecutive job stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpan {
    pub from_job_number: String,
    pub to_job_number: String,
    pub departed_at: DateTime<Utc>,
    pub arrived_at: DateTime<Utc>,
    /// Minutes of meal break recorded inside the span.
    pub meal_minutes: i64,
}

/// How loudly a transit finding should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitSeverity {
    Low,
    High,
}

/// Assessment of one job-to-job span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitAnomaly {
    pub from_job_number: String,
    pub to_job_number: String,
    pub departed_at: DateTime<Utc>,
    pub arrived_at: DateTime<Utc>,
    pub expected_drive_minutes: f64,
    /// Elapsed minutes between departure and arrival, net of meal breaks,
    /// clamped at zero.
    pub actual_transit_minutes: f64,
    pub meal_minutes: i64,
    /// `actual_transit_minutes - expected_drive_minutes`; negative when the
    /// drive was faster than expected.
    pub excess_minutes: f64,
    pub is_suspicious: bool,
    pub severity: TransitSeverity,
}

/// Extract every `left_job` → next `arrived_job` span from an ordered event
/// stream, netting out meal-break pairs that fall entirely inside the span.
pub fn extract_job_spans(events: &[TimelineEvent]) -> Vec<JobSpan> {
    let mut spans = Vec::new();
    let mut pending: Option<(String, DateTime<Utc>)> = None;

    for event in events {
        match event {
            TimelineEvent::LeftJob {
                time, job_number, ..
            } => {
                pending = Some((job_number.clone(), *time));
            }
            TimelineEvent::ArrivedJob {
                time, job_number, ..
            } => {
                if let Some((from_job_number, departed_at)) = pending.take() {
                    spans.push(JobSpan {
                        from_job_number,
                        to_job_number: job_number.clone(),
                        departed_at,
                        arrived_at: *time,
                        meal_minutes: meal_minutes_within(events, departed_at, *time),
                    });
                }
            }
            _ => {}
        }
    }

    spans
}

/// Sum whole meal breaks (`meal_start`/`meal_end` pairs) inside a window.
/// Unpaired meal events are ignored.
fn meal_minutes_within(
    events: &[TimelineEvent],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
) -> i64 {
    let mut total = 0;
    let mut open_meal: Option<DateTime<Utc>> = None;

    for event in events {
        match event {
            TimelineEvent::MealStart { time } => open_meal = Some(*time),
            TimelineEvent::MealEnd { time } => {
                if let Some(start) = open_meal.take() {
                    if start >= window_start && *time <= window_end {
                        total += (*time - start).num_minutes().max(0);
                    }
                }
            }
            _ => {}
        }
    }

    total
}

/// Assess one span against its externally supplied expected drive time.
pub fn assess_span(
    span: &JobSpan,
    expected_drive_minutes: f64,
    config: &EngineConfig,
) -> TransitAnomaly {
    let elapsed = (span.arrived_at - span.departed_at).num_seconds() as f64 / 60.0;
    let actual_transit_minutes = (elapsed - span.meal_minutes as f64).max(0.0);
    let excess_minutes = actual_transit_minutes - expected_drive_minutes;

    let severity = if excess_minutes >= config.transit_alert_minutes {
        TransitSeverity::High
    } else {
        TransitSeverity::Low
    };

    TransitAnomaly {
        from_job_number: span.from_job_number.clone(),
        to_job_number: span.to_job_number.clone(),
        departed_at: span.departed_at,
        arrived_at: span.arrived_at,
        expected_drive_minutes,
        actual_transit_minutes,
        meal_minutes: span.meal_minutes,
        excess_minutes,
        is_suspicious: excess_minutes > config.transit_excess_threshold_minutes,
        severity,
    }
}

/// Assess every span against its expected drive time.
///
/// `expected_minutes` is index-aligned with `spans`; a length mismatch is a
/// caller bug and the shorter of the two bounds the output.
pub fn detect_transit_anomalies(
    spans: &[JobSpan],
    expected_minutes: &[f64],
    config: &EngineConfig,
) -> Vec<TransitAnomaly> {
    if spans.len() != expected_minutes.len() {
        warn!(
            "transit assessment input mismatch: {} spans, {} expected times",
            spans.len(),
            expected_minutes.len()
        );
    }

    spans
        .iter()
        .zip(expected_minutes)
        .map(|(span, expected)| assess_span(span, *expected, config))
        .collect()
}
