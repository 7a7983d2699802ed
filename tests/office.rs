//! Tests for office module

use chrono::{DateTime, TimeZone, Utc};
use fieldtrace::geo_utils::EARTH_RADIUS_FEET;
use fieldtrace::{
    detect_office_visits, EngineConfig, GpsPoint, Job, OfficeVisitKind, TechnicianConfig,
    TripSegment,
};

const OFFICE: GpsPoint = GpsPoint {
    latitude: 33.4484,
    longitude: -112.0740,
};

fn offset_north(p: &GpsPoint, feet: f64) -> GpsPoint {
    let dlat = (feet / EARTH_RADIUS_FEET).to_degrees();
    GpsPoint::new(p.latitude + dlat, p.longitude)
}

fn home() -> GpsPoint {
    offset_north(&OFFICE, 50_000.0)
}

fn far() -> GpsPoint {
    offset_north(&OFFICE, 100_000.0)
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, h, m, 0).unwrap()
}

fn seg(start: DateTime<Utc>, end: DateTime<Utc>, from: GpsPoint, to: GpsPoint) -> TripSegment {
    TripSegment {
        start_time: start,
        end_time: Some(end),
        start_point: from,
        start_address: "From St".to_string(),
        end_point: Some(to),
        end_address: Some("To St".to_string()),
        complete: true,
    }
}

fn job_scheduled(time: DateTime<Utc>) -> Job {
    Job {
        id: "job-1".to_string(),
        job_number: "10001".to_string(),
        customer: "Acme".to_string(),
        address: "17 Mesa Dr".to_string(),
        scheduled_at: time,
        site: Some(far()),
        first_of_day: true,
    }
}

fn technician() -> TechnicianConfig {
    TechnicianConfig {
        technician_id: "tech-1".to_string(),
        name: "A. Tester".to_string(),
        office: OFFICE,
        office_address: "100 Depot Rd".to_string(),
        takes_vehicle_home: false,
        home: None,
        home_address: None,
        custom_locations: vec![],
    }
}

fn take_home_technician() -> TechnicianConfig {
    let mut tech = technician();
    tech.takes_vehicle_home = true;
    tech.home = Some(home());
    tech.home_address = Some("12 Home Ct".to_string());
    tech
}

#[test]
fn test_visits_ten_minutes_apart_are_merged() {
    let segments = vec![
        seg(at(14, 0), at(15, 0), far(), OFFICE),
        // Left at 15:10, re-parked at 15:20: a warehouse loop, one visit.
        seg(at(15, 10), at(15, 20), OFFICE, OFFICE),
    ];

    let visits = detect_office_visits(&segments, &[], &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].arrived_at, Some(at(15, 0)));
}

#[test]
fn test_visits_twenty_minutes_apart_stay_separate() {
    let segments = vec![
        seg(at(14, 0), at(15, 0), far(), OFFICE),
        seg(at(15, 10), at(15, 30), OFFICE, OFFICE),
    ];

    let visits = detect_office_visits(&segments, &[], &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 2);
}

#[test]
fn test_merge_window_boundary_is_inclusive() {
    let segments = vec![
        seg(at(14, 0), at(15, 0), far(), OFFICE),
        // Gap from 15:10 departure to arrival is exactly 15 minutes.
        seg(at(15, 10), at(15, 25), OFFICE, OFFICE),
    ];

    let visits = detect_office_visits(&segments, &[], &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
}

#[test]
fn test_merging_extends_departure() {
    let segments = vec![
        seg(at(14, 0), at(15, 0), far(), OFFICE),
        seg(at(15, 10), at(15, 20), OFFICE, OFFICE),
        seg(at(15, 40), at(16, 10), OFFICE, far()),
    ];

    let visits = detect_office_visits(&segments, &[], &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].arrived_at, Some(at(15, 0)));
    assert_eq!(visits[0].departed_at, Some(at(15, 40)));
    assert_eq!(visits[0].duration_minutes, Some(40));
}

#[test]
fn test_day_start_at_office_is_synthetic_morning_departure() {
    let segments = vec![seg(at(14, 0), at(14, 30), OFFICE, far())];

    let visits = detect_office_visits(&segments, &[], &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].arrived_at, None);
    assert_eq!(visits[0].departed_at, Some(at(14, 0)));
    assert_eq!(visits[0].kind, OfficeVisitKind::MorningDeparture);
    assert!(!visits[0].is_unnecessary);
}

#[test]
fn test_stop_before_first_job_is_morning_departure() {
    let jobs = vec![job_scheduled(at(16, 0))];
    let segments = vec![
        seg(at(14, 0), at(14, 30), far(), OFFICE),
        seg(at(15, 0), at(15, 45), OFFICE, far()),
    ];

    let visits = detect_office_visits(&segments, &jobs, &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].kind, OfficeVisitKind::MorningDeparture);
    assert!(!visits[0].is_unnecessary);
}

#[test]
fn test_detour_from_home_is_unnecessary_mid_day_visit() {
    // Take-home technician left home, swung by the office before the first
    // job: reclassified as an unnecessary mid-day visit.
    let jobs = vec![job_scheduled(at(16, 0))];
    let segments = vec![
        seg(at(14, 0), at(14, 30), home(), OFFICE),
        seg(at(15, 0), at(15, 45), OFFICE, far()),
    ];

    let visits =
        detect_office_visits(&segments, &jobs, &take_home_technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].kind, OfficeVisitKind::MidDayVisit);
    assert!(visits[0].is_unnecessary);
}

#[test]
fn test_arrival_after_five_pm_local_is_end_of_day() {
    // 23:00 UTC is 18:00 at the office (fixed -5 offset).
    let jobs = vec![job_scheduled(at(15, 0))];
    let segments = vec![
        seg(at(22, 0), at(23, 0), far(), OFFICE),
        seg(at(23, 30), at(23, 50), OFFICE, far()),
    ];

    let visits = detect_office_visits(&segments, &jobs, &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].kind, OfficeVisitKind::EndOfDay);
}

#[test]
fn test_last_visit_without_departure_is_end_of_day() {
    // 20:00 UTC is only 15:00 local, but the vehicle never left again.
    let jobs = vec![job_scheduled(at(15, 0))];
    let segments = vec![seg(at(19, 0), at(20, 0), far(), OFFICE)];

    let visits = detect_office_visits(&segments, &jobs, &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].departed_at, None);
    assert_eq!(visits[0].kind, OfficeVisitKind::EndOfDay);
}

#[test]
fn test_mid_day_visit() {
    let jobs = vec![job_scheduled(at(15, 0))];
    let segments = vec![
        seg(at(14, 0), at(15, 30), far(), far()),
        seg(at(17, 30), at(18, 0), far(), OFFICE),
        seg(at(18, 30), at(19, 0), OFFICE, far()),
    ];

    let visits = detect_office_visits(&segments, &jobs, &technician(), &EngineConfig::default());
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0].kind, OfficeVisitKind::MidDayVisit);
    assert_eq!(visits[0].duration_minutes, Some(30));
}

#[test]
fn test_no_segments_no_visits() {
    let visits = detect_office_visits(&[], &[], &technician(), &EngineConfig::default());
    assert!(visits.is_empty());
}

#[test]
fn test_segment_without_resolved_end_contributes_no_visit() {
    let mut unfinished = seg(at(14, 0), at(15, 0), far(), OFFICE);
    unfinished.end_time = None;
    unfinished.complete = false;

    let visits =
        detect_office_visits(&[unfinished], &[], &technician(), &EngineConfig::default());
    assert!(visits.is_empty());
}
