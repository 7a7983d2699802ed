//! Stop-location classification.
//!
//! Classification is priority-ordered and short-circuits on first match:
//! 1. A job matched to this stop wins outright — a geofence that happens to
//!    overlap a job site must not mask the job attribution.
//! 2. Office outranks everything else as the unambiguous organizational
//!    anchor.
//! 3. Custom labeled geofences, in configuration order.
//! 4. Home, only when the technician takes the vehicle home and a home
//!    coordinate is configured.
//! 5. Unknown.

use crate::geo_utils::{point_in_polygon, within_radius};
use crate::{EngineConfig, GpsPoint, Job, LocationBoundary, TechnicianConfig};

/// The semantic category of a stop location.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationCategory {
    Job,
    Office,
    /// A custom labeled geofence, carrying its configured name and category.
    Custom { name: String, category: String },
    Home,
    Unknown,
}

/// Classify a coordinate against a technician's configured geofences.
///
/// `matched_job` is the already-resolved job association for this stop, if
/// any (segment end-points only); it takes priority over every geofence.
pub fn classify_location(
    point: &GpsPoint,
    technician: &TechnicianConfig,
    matched_job: Option<&Job>,
    config: &EngineConfig,
) -> LocationCategory {
    if matched_job.is_some() {
        return LocationCategory::Job;
    }

    if within_radius(point, &technician.office, config.office_radius_feet) {
        return LocationCategory::Office;
    }

    for location in &technician.custom_locations {
        let contained = match &location.boundary {
            LocationBoundary::Circle {
                center,
                radius_feet,
            } => within_radius(point, center, *radius_feet),
            LocationBoundary::Polygon { vertices } => point_in_polygon(point, vertices),
        };
        if contained {
            return LocationCategory::Custom {
                name: location.name.clone(),
                category: location.category.clone(),
            };
        }
    }

    if technician.takes_vehicle_home {
        if let Some(home) = &technician.home {
            if within_radius(point, home, config.home_radius_feet) {
                return LocationCategory::Home;
            }
        }
    }

    LocationCategory::Unknown
}
