//! Multi-day home-location inference.
//!
//! Unsupervised batch routine over many days of first-segment start points
//! for a single technician. Days that start inside the office geofence tell
//! us nothing about home and are discarded; the rest are clustered and the
//! densest cluster becomes the suggestion. The output is advisory — it only
//! becomes home configuration once a human confirms it.

use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::geo_utils::{compute_center, within_radius};
use crate::{EngineConfig, GpsPoint};

/// Minimum days of data before inference is attempted.
const MIN_DAYS_ANALYZED: usize = 5;

/// Minimum non-office days remaining after filtering.
const MIN_NON_OFFICE_DAYS: usize = 3;

/// High confidence: at least this many informative days...
const HIGH_MIN_DAYS: usize = 10;
/// ...with the winning cluster covering at least this share of them.
const HIGH_MIN_SHARE: f64 = 0.8;

/// Medium confidence thresholds.
const MEDIUM_MIN_MEMBERS: usize = 5;
const MEDIUM_MIN_SHARE: f64 = 0.5;

/// Low confidence: bare minimum cluster size for any suggestion.
const LOW_MIN_MEMBERS: usize = 3;

/// Where a technician's vehicle started one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayStart {
    pub date: NaiveDate,
    pub point: GpsPoint,
    pub address: String,
}

/// Confidence level of a home-location suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeConfidence {
    High,
    Medium,
    Low,
}

/// An inferred home location, pending human confirmation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSuggestion {
    /// Mean coordinate of the winning cluster.
    pub point: GpsPoint,
    /// Most frequent address string in the winning cluster.
    pub address: String,
    pub confidence: HomeConfidence,
    /// Days in the winning cluster.
    pub supporting_days: u32,
    /// Total days supplied, before office filtering.
    pub analyzed_days: u32,
}

/// A cluster of day-start points. The center is fixed as the first member and
/// never recomputed — an intentional approximation that biases toward early
/// days but keeps the clustering simple and deterministic.
struct Cluster {
    center: GpsPoint,
    members: Vec<usize>,
}

/// Infer a technician's home location from multi-day start points.
///
/// Returns `None` (not an error) when there is too little data: fewer than 5
/// days supplied, fewer than 3 non-office days, or a winning cluster below 3
/// members. Callers should present this as "could not detect", not retry.
pub fn infer_home_location(
    day_starts: &[DayStart],
    office: &GpsPoint,
    config: &EngineConfig,
) -> Option<HomeSuggestion> {
    if day_starts.len() < MIN_DAYS_ANALYZED {
        debug!(
            "home inference skipped: {} days supplied, need {}",
            day_starts.len(),
            MIN_DAYS_ANALYZED
        );
        return None;
    }

    let non_office: Vec<&DayStart> = day_starts
        .iter()
        .filter(|day| !within_radius(&day.point, office, config.office_radius_feet))
        .collect();

    if non_office.len() < MIN_NON_OFFICE_DAYS {
        debug!(
            "home inference skipped: only {} non-office days",
            non_office.len()
        );
        return None;
    }

    // Greedy single-link clustering: attach each point to the first cluster
    // whose (fixed) center is within range, else start a new cluster.
    let mut clusters: Vec<Cluster> = Vec::new();
    for (i, day) in non_office.iter().enumerate() {
        match clusters
            .iter_mut()
            .find(|c| within_radius(&day.point, &c.center, config.cluster_radius_feet))
        {
            Some(cluster) => cluster.members.push(i),
            None => clusters.push(Cluster {
                center: day.point,
                members: vec![i],
            }),
        }
    }

    // Largest cluster wins; ties go to the earliest-started cluster.
    let winner = clusters.iter().reduce(|best, candidate| {
        if candidate.members.len() > best.members.len() {
            candidate
        } else {
            best
        }
    })?;

    let members = winner.members.len();
    let share = members as f64 / non_office.len() as f64;

    let confidence = if non_office.len() >= HIGH_MIN_DAYS && share >= HIGH_MIN_SHARE {
        HomeConfidence::High
    } else if members >= MEDIUM_MIN_MEMBERS && share >= MEDIUM_MIN_SHARE {
        HomeConfidence::Medium
    } else if members >= LOW_MIN_MEMBERS {
        HomeConfidence::Low
    } else {
        debug!("home inference inconclusive: winning cluster has {members} members");
        return None;
    };

    let points: Vec<GpsPoint> = winner.members.iter().map(|&i| non_office[i].point).collect();
    let address = most_frequent_address(winner, &non_office);

    Some(HomeSuggestion {
        point: compute_center(&points),
        address,
        confidence,
        supporting_days: members as u32,
        analyzed_days: day_starts.len() as u32,
    })
}

/// Most frequent address among cluster members; ties break by insertion
/// order (earliest first-seen address wins).
fn most_frequent_address(winner: &Cluster, non_office: &[&DayStart]) -> String {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for &i in &winner.members {
        let address = non_office[i].address.as_str();
        match counts.iter_mut().find(|(a, _)| *a == address) {
            Some((_, n)) => *n += 1,
            None => counts.push((address, 1)),
        }
    }

    counts
        .into_iter()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
        .map(|(address, _)| address.to_string())
        .unwrap_or_default()
}
