//! Synthetic technician-day generator for benches and stress tests.
//!
//! Produces deterministic, seeded days with a known shape (home → N jobs →
//! office) and configurable GPS noise, providing ground truth for the
//! timeline builder.
//!
//! # Example
//!
//! ```rust
//! use fieldtrace::synthetic::DayScenario;
//!
//! let scenario = DayScenario {
//!     job_count: 4,
//!     seed: 7,
//!     ..DayScenario::default()
//! };
//!
//! let day = scenario.generate();
//! assert_eq!(day.jobs.len(), 4);
//! assert_eq!(day.segments.len(), 5); // home -> 4 jobs -> office
//! ```

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{GpsPoint, Job, TechnicianConfig, TripSegment};

/// Feet per degree of latitude, for offset math.
const FEET_PER_DEGREE_LAT: f64 = 364_000.0;

/// Configuration for a synthetic technician-day.
#[derive(Debug, Clone)]
pub struct DayScenario {
    /// Office coordinate; home and job sites scatter around it.
    pub office: GpsPoint,
    /// Number of job stops between leaving home and parking at the office.
    pub job_count: usize,
    /// UTC hour the vehicle leaves home.
    pub start_hour: u32,
    /// Dwell time at each job, in minutes.
    pub stop_minutes: i64,
    /// Drive time between stops, in minutes.
    pub drive_minutes: i64,
    /// Uniform GPS noise applied to stop coordinates, in feet.
    pub gps_noise_feet: f64,
    /// RNG seed; the same seed reproduces the same day.
    pub seed: u64,
}

impl Default for DayScenario {
    fn default() -> Self {
        Self {
            office: GpsPoint::new(33.4484, -112.0740),
            job_count: 6,
            start_hour: 13, // 8 AM local in the default office zone
            stop_minutes: 45,
            drive_minutes: 20,
            gps_noise_feet: 40.0,
            seed: 42,
        }
    }
}

/// A generated day with ground truth inputs.
#[derive(Debug, Clone)]
pub struct SyntheticDay {
    pub date: NaiveDate,
    pub segments: Vec<TripSegment>,
    pub jobs: Vec<Job>,
    pub technician: TechnicianConfig,
}

impl DayScenario {
    /// Generate a technician-day: leave home, drive to each job in schedule
    /// order, park at the office.
    pub fn generate(&self) -> SyntheticDay {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap_or_default();

        // Home a few miles out from the office.
        let home = offset_feet(&self.office, 14_000.0, -9_000.0);

        let jobs: Vec<Job> = (0..self.job_count)
            .map(|i| {
                let north = rng.gen_range(-25_000.0..25_000.0);
                let east = rng.gen_range(-25_000.0..25_000.0);
                let site = offset_feet(&self.office, north, east);
                let scheduled_at = day_time(date, self.start_hour)
                    + Duration::minutes((i as i64 + 1) * (self.drive_minutes + self.stop_minutes));

                Job {
                    id: format!("job-{i}"),
                    job_number: format!("{:05}", 10_000 + i),
                    customer: format!("Customer {i}"),
                    address: format!("{} Synthetic Ave", 100 + i),
                    scheduled_at,
                    site: Some(site),
                    first_of_day: i == 0,
                }
            })
            .collect();

        let mut segments = Vec::with_capacity(self.job_count + 1);
        let mut cursor = day_time(date, self.start_hour);
        let mut from = (home, "12 Home Ct".to_string());

        for job in &jobs {
            let site = job.site.unwrap_or(self.office);
            let arrived = cursor + Duration::minutes(self.drive_minutes);
            segments.push(TripSegment {
                start_time: cursor,
                end_time: Some(arrived),
                start_point: self.jitter(&mut rng, &from.0),
                start_address: from.1.clone(),
                end_point: Some(self.jitter(&mut rng, &site)),
                end_address: Some(job.address.clone()),
                complete: true,
            });
            cursor = arrived + Duration::minutes(self.stop_minutes);
            from = (site, job.address.clone());
        }

        // Final leg back to the office.
        let arrived = cursor + Duration::minutes(self.drive_minutes);
        segments.push(TripSegment {
            start_time: cursor,
            end_time: Some(arrived),
            start_point: self.jitter(&mut rng, &from.0),
            start_address: from.1,
            end_point: Some(self.jitter(&mut rng, &self.office)),
            end_address: Some("100 Depot Rd".to_string()),
            complete: true,
        });

        let technician = TechnicianConfig {
            technician_id: format!("synthetic-{}", self.seed),
            name: "Synthetic Technician".to_string(),
            office: self.office,
            office_address: "100 Depot Rd".to_string(),
            takes_vehicle_home: true,
            home: Some(home),
            home_address: Some("12 Home Ct".to_string()),
            custom_locations: vec![],
        };

        SyntheticDay {
            date,
            segments,
            jobs,
            technician,
        }
    }

    fn jitter(&self, rng: &mut StdRng, point: &GpsPoint) -> GpsPoint {
        if self.gps_noise_feet <= 0.0 {
            return *point;
        }
        let north = rng.gen_range(-self.gps_noise_feet..self.gps_noise_feet);
        let east = rng.gen_range(-self.gps_noise_feet..self.gps_noise_feet);
        offset_feet(point, north, east)
    }
}

/// Offset a point by feet north and east.
fn offset_feet(origin: &GpsPoint, north_feet: f64, east_feet: f64) -> GpsPoint {
    let lat = origin.latitude + north_feet / FEET_PER_DEGREE_LAT;
    let feet_per_degree_lng = FEET_PER_DEGREE_LAT * origin.latitude.to_radians().cos();
    let lng = origin.longitude + east_feet / feet_per_degree_lng;
    GpsPoint::new(lat, lng)
}

fn day_time(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap_or_default())
}
