//! Geographic utilities (distance, containment, center calculations).

use crate::GpsPoint;

/// Earth radius in feet, matching the upstream telemetry provider's constant.
pub const EARTH_RADIUS_FEET: f64 = 20_902_231.0;

/// Great-circle (haversine) distance between two points, in feet.
///
/// Symmetric, zero for identical points.
///
/// # Example
/// ```
/// use fieldtrace::geo_utils::distance_feet;
/// use fieldtrace::GpsPoint;
///
/// let p = GpsPoint::new(33.4484, -112.0740);
/// assert_eq!(distance_feet(&p, &p), 0.0);
/// ```
pub fn distance_feet(a: &GpsPoint, b: &GpsPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    EARTH_RADIUS_FEET * 2.0 * h.sqrt().asin()
}

/// Whether two points lie within `radius_feet` of each other.
pub fn within_radius(a: &GpsPoint, b: &GpsPoint, radius_feet: f64) -> bool {
    distance_feet(a, b) <= radius_feet
}

/// Ray-casting point-in-polygon parity test.
///
/// Fewer than 3 vertices is a degenerate geofence and returns `false` rather
/// than erroring: a broken boundary must never claim a point.
pub fn point_in_polygon(point: &GpsPoint, vertices: &[GpsPoint]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let x = point.longitude;
    let y = point.latitude;

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, yi) = (vertices[i].longitude, vertices[i].latitude);
        let (xj, yj) = (vertices[j].longitude, vertices[j].latitude);

        let crosses = ((yi > y) != (yj > y)) && x < (xj - xi) * (y - yi) / (yj - yi) + xi;
        if crosses {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Arithmetic mean of a set of points. Returns (0, 0) for an empty set.
pub fn compute_center(points: &[GpsPoint]) -> GpsPoint {
    if points.is_empty() {
        return GpsPoint::new(0.0, 0.0);
    }

    let n = points.len() as f64;
    let lat_sum: f64 = points.iter().map(|p| p.latitude).sum();
    let lng_sum: f64 = points.iter().map(|p| p.longitude).sum();

    GpsPoint::new(lat_sum / n, lng_sum / n)
}
