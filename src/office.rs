//! Office-visit detection and consolidation.
//!
//! Runs over the full day's segments independently of the timeline builder
//! (it feeds the office-visit summary, not the raw event stream).
//!
//! ## Algorithm
//! 1. Collect raw visits: the day-start-at-office case plus every segment
//!    whose end lands inside the office geofence
//! 2. Consolidate visits separated by less than the merge window (a
//!    warehouse loop or a re-park shows up as two GPS stops, one real visit)
//! 3. Classify each consolidated visit as a morning departure, mid-day
//!    visit, or end-of-day parking, and flag visits that should not have
//!    occurred

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::geo_utils::within_radius;
use crate::{EngineConfig, Job, TechnicianConfig, TripSegment};

/// Classification of a consolidated office visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfficeVisitKind {
    /// Vehicle started the day at the office, or stopped there before the
    /// first job.
    MorningDeparture,
    /// A visit in the middle of the working day.
    MidDayVisit,
    /// Arrival at or after the end-of-day hour, or final visit with no
    /// departure.
    EndOfDay,
}

/// A consolidated visit to the office geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeVisit {
    /// `None` for the synthetic "already there at day start" visit.
    pub arrived_at: Option<DateTime<Utc>>,
    /// `None` when the vehicle was still at the office at day end.
    pub departed_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub kind: OfficeVisitKind,
    /// A stop at the office that a take-home technician heading to their
    /// first job had no reason to make.
    pub is_unnecessary: bool,
}

/// Raw visit before consolidation. The synthetic day-start visit has no real
/// arrival; its effective arrival and departure are the first segment's start.
struct RawVisit {
    arrived_at: Option<DateTime<Utc>>,
    departed_at: Option<DateTime<Utc>>,
    effective_arrival: DateTime<Utc>,
}

impl RawVisit {
    fn effective_departure(&self) -> DateTime<Utc> {
        self.departed_at.unwrap_or(self.effective_arrival)
    }
}

/// Detect, consolidate, and classify the day's office visits.
pub fn detect_office_visits(
    segments: &[TripSegment],
    jobs: &[Job],
    technician: &TechnicianConfig,
    config: &EngineConfig,
) -> Vec<OfficeVisit> {
    let mut ordered: Vec<&TripSegment> = segments.iter().collect();
    ordered.sort_by_key(|s| s.start_time);

    let raw = collect_raw_visits(&ordered, technician, config);
    let consolidated = consolidate(raw, config);
    classify(consolidated, &ordered, jobs, technician, config)
}

fn collect_raw_visits(
    ordered: &[&TripSegment],
    technician: &TechnicianConfig,
    config: &EngineConfig,
) -> Vec<RawVisit> {
    let mut visits = Vec::new();

    let Some(first) = ordered.first() else {
        return visits;
    };

    if within_radius(&first.start_point, &technician.office, config.office_radius_feet) {
        visits.push(RawVisit {
            arrived_at: None,
            departed_at: Some(first.start_time),
            effective_arrival: first.start_time,
        });
    }

    for (i, segment) in ordered.iter().enumerate() {
        let (Some(end_point), Some(end_time)) = (&segment.end_point, segment.end_time) else {
            continue;
        };
        if !within_radius(end_point, &technician.office, config.office_radius_feet) {
            continue;
        }

        visits.push(RawVisit {
            arrived_at: Some(end_time),
            departed_at: ordered.get(i + 1).map(|next| next.start_time),
            effective_arrival: end_time,
        });
    }

    visits
}

/// Merge a visit into its predecessor when the gap between the previous
/// effective departure and the new arrival is within the merge window.
/// Merging extends the previous visit's departure to the new one's.
fn consolidate(raw: Vec<RawVisit>, config: &EngineConfig) -> Vec<RawVisit> {
    let window = Duration::minutes(config.office_visit_merge_minutes);
    let mut consolidated: Vec<RawVisit> = Vec::with_capacity(raw.len());

    for visit in raw {
        if let Some(previous) = consolidated.last_mut() {
            let gap = visit.effective_arrival - previous.effective_departure();
            if gap <= window {
                previous.departed_at = visit.departed_at;
                continue;
            }
        }
        consolidated.push(visit);
    }

    consolidated
}

fn classify(
    consolidated: Vec<RawVisit>,
    ordered: &[&TripSegment],
    jobs: &[Job],
    technician: &TechnicianConfig,
    config: &EngineConfig,
) -> Vec<OfficeVisit> {
    let first_job_scheduled = first_job_scheduled_time(jobs);
    let started_at_home = day_started_at_home(ordered, technician, config);
    let count = consolidated.len();

    consolidated
        .into_iter()
        .enumerate()
        .map(|(i, visit)| {
            let mut is_unnecessary = false;

            let kind = if i == 0 && visit.arrived_at.is_none() {
                OfficeVisitKind::MorningDeparture
            } else if first_job_scheduled.is_some_and(|sched| visit.effective_arrival < sched) {
                // A pre-first-job stop is a normal morning departure unless
                // the vehicle came from home, in which case the office was a
                // detour.
                if started_at_home && technician.takes_vehicle_home && technician.home.is_some() {
                    is_unnecessary = true;
                    OfficeVisitKind::MidDayVisit
                } else {
                    OfficeVisitKind::MorningDeparture
                }
            } else if office_local_hour(visit.effective_arrival, config) >= config.end_of_day_hour {
                OfficeVisitKind::EndOfDay
            } else if i == count - 1 && visit.departed_at.is_none() {
                OfficeVisitKind::EndOfDay
            } else {
                OfficeVisitKind::MidDayVisit
            };

            let duration_minutes = match (visit.arrived_at, visit.departed_at) {
                (Some(arrived), Some(departed)) => {
                    Some((departed - arrived).num_minutes().max(0))
                }
                _ => None,
            };

            OfficeVisit {
                arrived_at: visit.arrived_at,
                departed_at: visit.departed_at,
                duration_minutes,
                kind,
                is_unnecessary,
            }
        })
        .collect()
}

/// Scheduled time of the day's first job: the flagged job, else the earliest.
pub(crate) fn first_job_scheduled_time(jobs: &[Job]) -> Option<DateTime<Utc>> {
    jobs.iter()
        .find(|j| j.first_of_day)
        .or_else(|| jobs.iter().min_by_key(|j| j.scheduled_at))
        .map(|j| j.scheduled_at)
}

pub(crate) fn day_started_at_home(
    ordered: &[&TripSegment],
    technician: &TechnicianConfig,
    config: &EngineConfig,
) -> bool {
    let (Some(first), Some(home)) = (ordered.first(), &technician.home) else {
        return false;
    };
    within_radius(&first.start_point, home, config.home_radius_feet)
}

/// Hour of day in the office's time zone, via fixed-offset arithmetic.
/// No DST adjustment; the offset is configuration.
fn office_local_hour(time: DateTime<Utc>, config: &EngineConfig) -> u32 {
    (time.hour() as i32 + config.office_utc_offset_hours).rem_euclid(24) as u32
}
