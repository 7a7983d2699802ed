//! # Fieldtrace
//!
//! Timeline reconstruction and anomaly detection engine for a mobile
//! workforce.
//!
//! This library provides:
//! - Day-timeline reconstruction from vehicle trip segments and scheduled jobs
//! - Priority-ordered stop classification (job / office / custom / home)
//! - Office-visit detection, consolidation, and classification
//! - Job-to-job transit-time anomaly detection
//! - Multi-day home-location inference with confidence scoring
//!
//! ## Features
//!
//! - **`parallel`** - Batch timeline building across technician-days with rayon
//! - **`http`** - Best-effort reverse-geocoding client (rate-limited)
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use fieldtrace::{GpsPoint, Job, TechnicianConfig, TimelineBuilder, TripSegment};
//!
//! let technician = TechnicianConfig {
//!     technician_id: "tech-7".to_string(),
//!     name: "J. Ortiz".to_string(),
//!     office: GpsPoint::new(33.4484, -112.0740),
//!     office_address: "100 Depot Rd".to_string(),
//!     takes_vehicle_home: false,
//!     home: None,
//!     home_address: None,
//!     custom_locations: vec![],
//! };
//!
//! let jobs = vec![Job {
//!     id: "job-1".to_string(),
//!     job_number: "10453".to_string(),
//!     customer: "Acme Plumbing".to_string(),
//!     address: "17 Mesa Dr".to_string(),
//!     scheduled_at: Utc.with_ymd_and_hms(2024, 6, 3, 16, 0, 0).unwrap(),
//!     site: Some(GpsPoint::new(33.5020, -112.0500)),
//!     first_of_day: true,
//! }];
//!
//! let segments = vec![TripSegment {
//!     start_time: Utc.with_ymd_and_hms(2024, 6, 3, 15, 30, 0).unwrap(),
//!     end_time: Some(Utc.with_ymd_and_hms(2024, 6, 3, 16, 5, 0).unwrap()),
//!     start_point: GpsPoint::new(33.4484, -112.0740),
//!     start_address: "100 Depot Rd".to_string(),
//!     end_point: Some(GpsPoint::new(33.5020, -112.0500)),
//!     end_address: Some("17 Mesa Dr".to_string()),
//!     complete: true,
//! }];
//!
//! let builder = TimelineBuilder::new();
//! let day = builder.build_day(
//!     NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
//!     &segments,
//!     &jobs,
//!     &technician,
//! );
//!
//! assert_eq!(day.job_count, 1);
//! assert_eq!(day.first_job_variance_minutes, Some(5));
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{EngineError, Result};

// Timestamp normalization for upstream feeds
pub mod timestamp;
pub use timestamp::parse_utc;

// Geographic utilities (distance, containment, centers)
pub mod geo_utils;

// Priority-ordered stop classification
pub mod classify;
pub use classify::{classify_location, LocationCategory};

// Segment-to-job association
pub mod matching;
pub use matching::{match_segment_to_job, match_segments};

// Arrival-vs-schedule evaluation
pub mod lateness;
pub use lateness::{evaluate_arrival, ArrivalEvaluation};

// Office-visit detection and consolidation
pub mod office;
pub use office::{detect_office_visits, OfficeVisit, OfficeVisitKind};

// Job-to-job transit anomaly detection
pub mod transit;
pub use transit::{
    assess_span, detect_transit_anomalies, extract_job_spans, JobSpan, TransitAnomaly,
    TransitSeverity,
};

// Day-timeline builder (the externally visible result)
pub mod timeline;
#[cfg(feature = "parallel")]
pub use timeline::build_days_parallel;
pub use timeline::{merge_events, DayInput, TimelineBuilder};

// Multi-day home-location inference
pub mod home;
pub use home::{infer_home_location, DayStart, HomeConfidence, HomeSuggestion};

// TTL'd result cache owned by the calling layer
pub mod cache;
pub use cache::{day_key, ExpiringCache, TimelineCache};

// Reverse-geocoding client for labeling custom locations
#[cfg(feature = "http")]
pub mod geocode;
#[cfg(feature = "http")]
pub use geocode::GeocodeClient;

// Synthetic technician-day generator for benches and stress tests
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use fieldtrace::GpsPoint;
/// let point = GpsPoint::new(33.4484, -112.0740); // Phoenix
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One continuous vehicle drive from the GPS feed.
///
/// Segments for a day are contiguous in time but not end-to-end continuous in
/// space: the gap between one segment's end and the next segment's start is
/// dwell time at a stop. A segment with no resolved end (trip still in
/// progress at fetch time) contributes no arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripSegment {
    /// Drive start (UTC).
    pub start_time: DateTime<Utc>,
    /// Drive end (UTC); `None` if the trip was unfinished at fetch time.
    pub end_time: Option<DateTime<Utc>>,
    pub start_point: GpsPoint,
    pub start_address: String,
    pub end_point: Option<GpsPoint>,
    pub end_address: Option<String>,
    /// Whether the upstream feed marked this trip as complete.
    pub complete: bool,
}

impl TripSegment {
    /// Whether the segment has both an end time and an end coordinate.
    pub fn has_resolved_end(&self) -> bool {
        self.end_time.is_some() && self.end_point.is_some()
    }
}

/// A scheduled visit from the job-scheduling feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub job_number: String,
    pub customer: String,
    pub address: String,
    /// Scheduled start (UTC).
    pub scheduled_at: DateTime<Utc>,
    /// Geocoded site coordinate; jobs without one cannot be matched to stops.
    pub site: Option<GpsPoint>,
    /// Whether the scheduler marked this as the technician's first job of the
    /// day. When no job carries the flag, the earliest scheduled job is used.
    pub first_of_day: bool,
}

/// Boundary of a custom labeled geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum LocationBoundary {
    Circle { center: GpsPoint, radius_feet: f64 },
    Polygon { vertices: Vec<GpsPoint> },
}

/// A custom labeled geofence (supply house, yard, frequent customer, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLocation {
    pub name: String,
    pub category: String,
    pub boundary: LocationBoundary,
}

/// Per-technician settings used for classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicianConfig {
    pub technician_id: String,
    pub name: String,
    pub office: GpsPoint,
    pub office_address: String,
    /// Whether the technician takes the vehicle home overnight.
    pub takes_vehicle_home: bool,
    /// Human-confirmed home coordinate, if known.
    pub home: Option<GpsPoint>,
    pub home_address: Option<String>,
    pub custom_locations: Vec<CustomLocation>,
}

/// Configuration for the reconstruction engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Radius for associating a stop with a job site.
    /// Default: 300.0 ft (accounts for GPS drift and parking offset)
    pub arrival_radius_feet: f64,

    /// Radius of the office geofence.
    /// Default: 500.0 ft
    pub office_radius_feet: f64,

    /// Radius of the home geofence.
    /// Default: 500.0 ft
    pub home_radius_feet: f64,

    /// Office visits arriving within this window of the previous visit's
    /// effective departure are merged into it.
    /// Default: 15 minutes
    pub office_visit_merge_minutes: i64,

    /// Unknown stops shorter than this are dropped as transient
    /// (traffic lights, stops the GPS splits oddly).
    /// Default: 2 minutes
    pub min_unknown_stop_minutes: i64,

    /// Cluster attachment radius for home-location inference.
    /// Default: 500.0 ft
    pub cluster_radius_feet: f64,

    /// Transit excess above this is flagged suspicious.
    /// Default: 0.0 minutes (any positive excess)
    pub transit_excess_threshold_minutes: f64,

    /// Transit excess at or above this is high severity.
    /// Default: 30.0 minutes
    pub transit_alert_minutes: f64,

    /// Local hour at or after which an office arrival counts as end-of-day.
    /// Default: 17 (5 PM)
    pub end_of_day_hour: u32,

    /// Fixed UTC offset of the office time zone, in hours. Applied as plain
    /// hour arithmetic with no DST adjustment.
    /// Default: -5
    pub office_utc_offset_hours: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            arrival_radius_feet: 300.0,
            office_radius_feet: 500.0,
            home_radius_feet: 500.0,
            office_visit_merge_minutes: 15,
            min_unknown_stop_minutes: 2,
            cluster_radius_feet: 500.0,
            transit_excess_threshold_minutes: 0.0,
            transit_alert_minutes: 30.0,
            end_of_day_hour: 17,
            office_utc_offset_hours: -5,
        }
    }
}

/// One entry in a reconstructed day timeline.
///
/// A tagged union with one variant per event kind, so adding a kind without
/// handling it everywhere is a compile error. The punch-data variants
/// (`ClockIn` through `ProposedPunch`) are built by the surrounding system
/// and only interleaved here by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    LeftHome {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
    },
    ArrivedHome {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        travel_minutes: i64,
        duration_minutes: Option<i64>,
    },
    LeftOffice {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
    },
    ArrivedOffice {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        travel_minutes: i64,
        duration_minutes: Option<i64>,
        is_unnecessary: bool,
    },
    ArrivedJob {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        job_number: String,
        customer: String,
        scheduled_at: DateTime<Utc>,
        variance_minutes: i64,
        is_late: bool,
        is_first_job: bool,
        travel_minutes: i64,
        duration_minutes: Option<i64>,
    },
    LeftJob {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        job_number: String,
    },
    ArrivedUnknown {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        travel_minutes: i64,
        duration_minutes: i64,
    },
    LeftUnknown {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
    },
    ArrivedCustom {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        name: String,
        category: String,
        travel_minutes: i64,
        duration_minutes: Option<i64>,
    },
    LeftCustom {
        time: DateTime<Utc>,
        point: GpsPoint,
        address: String,
        name: String,
        category: String,
    },
    ClockIn {
        time: DateTime<Utc>,
    },
    ClockOut {
        time: DateTime<Utc>,
    },
    MealStart {
        time: DateTime<Utc>,
    },
    MealEnd {
        time: DateTime<Utc>,
    },
    MissingClockOut {
        time: DateTime<Utc>,
    },
    OvernightAtOffice {
        time: DateTime<Utc>,
    },
    ProposedPunch {
        time: DateTime<Utc>,
        note: String,
    },
}

impl TimelineEvent {
    /// The event's timestamp, used for ordering the day's stream.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TimelineEvent::LeftHome { time, .. }
            | TimelineEvent::ArrivedHome { time, .. }
            | TimelineEvent::LeftOffice { time, .. }
            | TimelineEvent::ArrivedOffice { time, .. }
            | TimelineEvent::ArrivedJob { time, .. }
            | TimelineEvent::LeftJob { time, .. }
            | TimelineEvent::ArrivedUnknown { time, .. }
            | TimelineEvent::LeftUnknown { time, .. }
            | TimelineEvent::ArrivedCustom { time, .. }
            | TimelineEvent::LeftCustom { time, .. }
            | TimelineEvent::ClockIn { time }
            | TimelineEvent::ClockOut { time }
            | TimelineEvent::MealStart { time }
            | TimelineEvent::MealEnd { time }
            | TimelineEvent::MissingClockOut { time }
            | TimelineEvent::OvernightAtOffice { time }
            | TimelineEvent::ProposedPunch { time, .. } => *time,
        }
    }

    /// The serialized kind tag for this event.
    pub fn kind(&self) -> &'static str {
        match self {
            TimelineEvent::LeftHome { .. } => "left_home",
            TimelineEvent::ArrivedHome { .. } => "arrived_home",
            TimelineEvent::LeftOffice { .. } => "left_office",
            TimelineEvent::ArrivedOffice { .. } => "arrived_office",
            TimelineEvent::ArrivedJob { .. } => "arrived_job",
            TimelineEvent::LeftJob { .. } => "left_job",
            TimelineEvent::ArrivedUnknown { .. } => "arrived_unknown",
            TimelineEvent::LeftUnknown { .. } => "left_unknown",
            TimelineEvent::ArrivedCustom { .. } => "arrived_custom",
            TimelineEvent::LeftCustom { .. } => "left_custom",
            TimelineEvent::ClockIn { .. } => "clock_in",
            TimelineEvent::ClockOut { .. } => "clock_out",
            TimelineEvent::MealStart { .. } => "meal_start",
            TimelineEvent::MealEnd { .. } => "meal_end",
            TimelineEvent::MissingClockOut { .. } => "missing_clock_out",
            TimelineEvent::OvernightAtOffice { .. } => "overnight_at_office",
            TimelineEvent::ProposedPunch { .. } => "proposed_punch",
        }
    }
}

/// A reconstructed technician-day: the externally visible result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayTimeline {
    pub technician_id: String,
    pub technician_name: String,
    pub date: NaiveDate,
    /// Day-of-week label, e.g. "Monday".
    pub day_of_week: String,
    /// Events ordered by timestamp ascending.
    pub events: Vec<TimelineEvent>,
    /// Number of job arrivals (a return visit counts again).
    pub job_count: u32,
    /// Number of office arrivals, pre-consolidation.
    pub office_visit_count: u32,
    /// Sum of positive travel minutes across the day.
    pub total_drive_minutes: i64,
    /// Whether the first job of the day was reached on time.
    /// `None` when the day had no first-job arrival.
    pub first_job_on_time: Option<bool>,
    pub first_job_variance_minutes: Option<i64>,
}
