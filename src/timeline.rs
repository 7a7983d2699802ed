//! Day-timeline reconstruction.
//!
//! Processes one technician-day's trip segments in ascending start-time
//! order, threading a previous-departure cursor: a stop's travel minutes come
//! from its own segment's drive time, its duration from the gap to the next
//! segment's start, and its "left" event fires at the next segment's start.
//! Punch events from the payroll feed are pre-built and only interleaved by
//! timestamp.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::classify::{classify_location, LocationCategory};
use crate::lateness::evaluate_arrival;
use crate::matching::match_segment_to_job;
use crate::office::day_started_at_home;
use crate::{DayTimeline, EngineConfig, Job, TechnicianConfig, TimelineEvent, TripSegment};

/// Builds day timelines from segments, jobs, and technician configuration.
///
/// Pure and synchronous: one call consumes one technician-day and returns one
/// timeline value with no side effects, so concurrent calls over different
/// days are safe.
#[derive(Debug, Clone, Default)]
pub struct TimelineBuilder {
    config: EngineConfig,
}

/// One technician-day's worth of inputs, for batch building.
#[derive(Debug, Clone)]
pub struct DayInput {
    pub date: NaiveDate,
    pub segments: Vec<TripSegment>,
    pub jobs: Vec<Job>,
    pub technician: TechnicianConfig,
}

impl TimelineBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Current engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reconstruct one technician-day.
    ///
    /// Segments may arrive unordered; they are sorted by start time. A day
    /// with no usable segments yields an empty timeline with zero totals and
    /// `None` lateness fields — the "no GPS data" terminal state, not an
    /// error.
    pub fn build_day(
        &self,
        date: NaiveDate,
        segments: &[TripSegment],
        jobs: &[Job],
        technician: &TechnicianConfig,
    ) -> DayTimeline {
        let mut ordered: Vec<&TripSegment> = segments.iter().collect();
        ordered.sort_by_key(|s| s.start_time);

        let mut timeline = empty_day(date, technician);

        let Some(first) = ordered.first() else {
            debug!(
                "no usable segments for {} on {}",
                technician.technician_id, date
            );
            return timeline;
        };

        let first_job = first_job_of_day(jobs);
        let first_job_scheduled = first_job.map(|j| j.scheduled_at);
        let started_from_home = day_started_at_home(&ordered, technician, &self.config);

        // The first segment's start emits a single "left" event, for home or
        // office only: there is no reliable departure semantics for an
        // unclassified origin.
        match classify_location(&first.start_point, technician, None, &self.config) {
            LocationCategory::Home => timeline.events.push(TimelineEvent::LeftHome {
                time: first.start_time,
                point: first.start_point,
                address: first.start_address.clone(),
            }),
            LocationCategory::Office => timeline.events.push(TimelineEvent::LeftOffice {
                time: first.start_time,
                point: first.start_point,
                address: first.start_address.clone(),
            }),
            _ => {}
        }

        for (i, segment) in ordered.iter().enumerate() {
            let (Some(end_point), Some(end_time)) = (segment.end_point, segment.end_time) else {
                // Unfinished trip: no arrival for this stop, but its start
                // already served as the previous stop's departure.
                continue;
            };

            let travel_minutes = (end_time - segment.start_time).num_minutes().max(0);
            // A "left" event must never precede the arrival it pairs with.
            let departure = ordered
                .get(i + 1)
                .map(|next| next.start_time.max(end_time));
            let duration_minutes = departure.map(|d| (d - end_time).num_minutes().max(0));

            if travel_minutes > 0 {
                timeline.total_drive_minutes += travel_minutes;
            }

            let address = segment.end_address.clone().unwrap_or_default();

            if let Some(job) = match_segment_to_job(segment, jobs, &self.config) {
                let eval = evaluate_arrival(end_time, job.scheduled_at);
                let is_first_job = first_job.is_some_and(|f| f.job_number == job.job_number);

                // Only the first qualifying arrival sets the day summary;
                // later arrivals keep their own variance.
                if is_first_job && timeline.first_job_on_time.is_none() {
                    timeline.first_job_on_time = Some(!eval.is_late);
                    timeline.first_job_variance_minutes = Some(eval.variance_minutes);
                }

                let address = if address.is_empty() {
                    job.address.clone()
                } else {
                    address
                };

                timeline.events.push(TimelineEvent::ArrivedJob {
                    time: end_time,
                    point: end_point,
                    address: address.clone(),
                    job_number: job.job_number.clone(),
                    customer: job.customer.clone(),
                    scheduled_at: job.scheduled_at,
                    variance_minutes: eval.variance_minutes,
                    is_late: eval.is_late,
                    is_first_job,
                    travel_minutes,
                    duration_minutes,
                });
                timeline.job_count += 1;

                if let Some(departed) = departure {
                    timeline.events.push(TimelineEvent::LeftJob {
                        time: departed,
                        point: end_point,
                        address,
                        job_number: job.job_number.clone(),
                    });
                }
                continue;
            }

            match classify_location(&end_point, technician, None, &self.config) {
                LocationCategory::Office => {
                    let is_unnecessary = technician.takes_vehicle_home
                        && technician.home.is_some()
                        && started_from_home
                        && first_job_scheduled.is_some_and(|sched| end_time < sched);

                    timeline.events.push(TimelineEvent::ArrivedOffice {
                        time: end_time,
                        point: end_point,
                        address: address.clone(),
                        travel_minutes,
                        duration_minutes,
                        is_unnecessary,
                    });
                    timeline.office_visit_count += 1;

                    if let Some(departed) = departure {
                        timeline.events.push(TimelineEvent::LeftOffice {
                            time: departed,
                            point: end_point,
                            address,
                        });
                    }
                }
                LocationCategory::Home => {
                    timeline.events.push(TimelineEvent::ArrivedHome {
                        time: end_time,
                        point: end_point,
                        address: address.clone(),
                        travel_minutes,
                        duration_minutes,
                    });
                    if let Some(departed) = departure {
                        timeline.events.push(TimelineEvent::LeftHome {
                            time: departed,
                            point: end_point,
                            address,
                        });
                    }
                }
                LocationCategory::Custom { name, category } => {
                    timeline.events.push(TimelineEvent::ArrivedCustom {
                        time: end_time,
                        point: end_point,
                        address: address.clone(),
                        name: name.clone(),
                        category: category.clone(),
                        travel_minutes,
                        duration_minutes,
                    });
                    if let Some(departed) = departure {
                        timeline.events.push(TimelineEvent::LeftCustom {
                            time: departed,
                            point: end_point,
                            address,
                            name,
                            category,
                        });
                    }
                }
                LocationCategory::Unknown => {
                    // Transient stops (traffic lights, brief pull-overs) are
                    // noise; only dwells past the minimum are reported.
                    let Some(duration) = duration_minutes else {
                        continue;
                    };
                    if duration < self.config.min_unknown_stop_minutes {
                        continue;
                    }

                    timeline.events.push(TimelineEvent::ArrivedUnknown {
                        time: end_time,
                        point: end_point,
                        address: address.clone(),
                        travel_minutes,
                        duration_minutes: duration,
                    });
                    if let Some(departed) = departure {
                        timeline.events.push(TimelineEvent::LeftUnknown {
                            time: departed,
                            point: end_point,
                            address,
                        });
                    }
                }
                // Job stops were handled above; with no matched job the
                // classifier cannot produce this arm.
                LocationCategory::Job => {}
            }
        }

        timeline.events.sort_by_key(TimelineEvent::timestamp);
        timeline
    }
}

/// The day's designated first job: the flagged one, else the earliest
/// scheduled.
fn first_job_of_day(jobs: &[Job]) -> Option<&Job> {
    jobs.iter()
        .find(|j| j.first_of_day)
        .or_else(|| jobs.iter().min_by_key(|j| j.scheduled_at))
}

fn empty_day(date: NaiveDate, technician: &TechnicianConfig) -> DayTimeline {
    DayTimeline {
        technician_id: technician.technician_id.clone(),
        technician_name: technician.name.clone(),
        date,
        day_of_week: date.format("%A").to_string(),
        events: Vec::new(),
        job_count: 0,
        office_visit_count: 0,
        total_drive_minutes: 0,
        first_job_on_time: None,
        first_job_variance_minutes: None,
    }
}

/// Interleave externally-built events (punch data, proposed corrections) into
/// a built timeline by timestamp. The sort is stable, so events sharing an
/// instant keep their insertion order.
pub fn merge_events(
    built: Vec<TimelineEvent>,
    external: Vec<TimelineEvent>,
) -> Vec<TimelineEvent> {
    let mut merged = built;
    merged.extend(external);
    merged.sort_by_key(TimelineEvent::timestamp);
    merged
}

/// Build many technician-days concurrently.
///
/// Sound because each day's inputs are disjoint and immutable for the
/// duration of the call; the builder itself holds only configuration.
#[cfg(feature = "parallel")]
pub fn build_days_parallel(builder: &TimelineBuilder, days: &[DayInput]) -> Vec<DayTimeline> {
    use rayon::prelude::*;

    days.par_iter()
        .map(|day| builder.build_day(day.date, &day.segments, &day.jobs, &day.technician))
        .collect()
}

impl DayTimeline {
    /// Serialize for the dashboard layer. Degrades to `"{}"` on failure
    /// rather than panicking.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            warn!(
                "failed to serialize timeline for {} on {}: {}",
                self.technician_id, self.date, e
            );
            "{}".to_string()
        })
    }
}
