//! Segment-to-job association by spatial proximity.
//!
//! A segment's end point is compared against every geocoded job site for the
//! day; the first job found within the arrival radius wins. The tie-break is
//! deliberately iteration order, not best-distance: a segment parked between
//! two adjacent sites pairs with whichever job the scheduler listed first,
//! which keeps the pairing deterministic and cheap. A job may match multiple
//! segments (a return visit); a segment matches at most one job.

use crate::geo_utils::within_radius;
use crate::{EngineConfig, Job, TripSegment};

/// Find the job a segment's end point arrived at, if any.
///
/// Jobs without a geocoded site are skipped silently — they cannot be matched
/// to any GPS stop. Returns `None` when the segment has no resolved end point
/// or no site lies within the arrival radius.
pub fn match_segment_to_job<'a>(
    segment: &TripSegment,
    jobs: &'a [Job],
    config: &EngineConfig,
) -> Option<&'a Job> {
    let end = segment.end_point.as_ref()?;

    jobs.iter().find(|job| {
        job.site
            .as_ref()
            .is_some_and(|site| within_radius(end, site, config.arrival_radius_feet))
    })
}

/// Match every segment in a day against the day's jobs.
///
/// The result is index-aligned with `segments`.
pub fn match_segments<'a>(
    segments: &[TripSegment],
    jobs: &'a [Job],
    config: &EngineConfig,
) -> Vec<Option<&'a Job>> {
    segments
        .iter()
        .map(|segment| match_segment_to_job(segment, jobs, config))
        .collect()
}
