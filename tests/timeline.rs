//! Tests for timeline module

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fieldtrace::geo_utils::EARTH_RADIUS_FEET;
use fieldtrace::{
    merge_events, CustomLocation, EngineConfig, GpsPoint, Job, LocationBoundary,
    TechnicianConfig, TimelineBuilder, TimelineEvent, TripSegment,
};

const OFFICE: GpsPoint = GpsPoint {
    latitude: 33.4484,
    longitude: -112.0740,
};

fn offset_north(p: &GpsPoint, feet: f64) -> GpsPoint {
    let dlat = (feet / EARTH_RADIUS_FEET).to_degrees();
    GpsPoint::new(p.latitude + dlat, p.longitude)
}

fn job_a_site() -> GpsPoint {
    offset_north(&OFFICE, 40_000.0)
}

fn home() -> GpsPoint {
    offset_north(&OFFICE, 80_000.0)
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
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

fn job_a(scheduled: DateTime<Utc>) -> Job {
    Job {
        id: "job-a".to_string(),
        job_number: "10453".to_string(),
        customer: "Acme Plumbing".to_string(),
        address: "17 Mesa Dr".to_string(),
        scheduled_at: scheduled,
        site: Some(job_a_site()),
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
fn test_end_to_end_day() {
    // office -> jobA (arrives 09:05 against a 09:00 schedule),
    // jobA -> an unmatched stop 600 ft from the site,
    // unmatched stop -> office.
    let unknown_stop = offset_north(&job_a_site(), 600.0);
    let segments = vec![
        seg(at(8, 30), at(9, 5), OFFICE, job_a_site()),
        seg(at(10, 30), at(10, 50), job_a_site(), unknown_stop),
        seg(at(16, 45), at(17, 15), unknown_stop, OFFICE),
    ];
    let jobs = vec![job_a(at(9, 0))];

    let day = TimelineBuilder::new().build_day(date(), &segments, &jobs, &technician());

    let kinds: Vec<&str> = day.events.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            "left_office",
            "arrived_job",
            "left_job",
            "arrived_unknown",
            "left_unknown",
            "arrived_office",
        ]
    );

    match &day.events[1] {
        TimelineEvent::ArrivedJob {
            time,
            job_number,
            variance_minutes,
            is_late,
            is_first_job,
            travel_minutes,
            duration_minutes,
            ..
        } => {
            assert_eq!(*time, at(9, 5));
            assert_eq!(job_number, "10453");
            assert_eq!(*variance_minutes, 5);
            assert!(*is_late);
            assert!(*is_first_job);
            assert_eq!(*travel_minutes, 35);
            assert_eq!(*duration_minutes, Some(85));
        }
        other => panic!("expected arrived_job, got {other:?}"),
    }

    match &day.events[3] {
        TimelineEvent::ArrivedUnknown {
            duration_minutes, ..
        } => assert_eq!(*duration_minutes, 355),
        other => panic!("expected arrived_unknown, got {other:?}"),
    }

    assert_eq!(day.job_count, 1);
    assert_eq!(day.office_visit_count, 1);
    assert_eq!(day.total_drive_minutes, 35 + 20 + 30);
    assert_eq!(day.first_job_on_time, Some(false));
    assert_eq!(day.first_job_variance_minutes, Some(5));
    assert_eq!(day.day_of_week, "Monday");
}

#[test]
fn test_one_minute_unknown_stop_is_filtered() {
    let stop = offset_north(&OFFICE, 40_000.0);
    let segments = vec![
        seg(at(9, 0), at(9, 20), OFFICE, stop),
        seg(at(9, 21), at(9, 50), stop, OFFICE),
    ];

    let day = TimelineBuilder::new().build_day(date(), &segments, &[], &technician());

    assert!(!day.events.iter().any(|e| e.kind() == "arrived_unknown"));
    assert!(!day.events.iter().any(|e| e.kind() == "left_unknown"));
}

#[test]
fn test_two_minute_unknown_stop_is_kept() {
    let stop = offset_north(&OFFICE, 40_000.0);
    let segments = vec![
        seg(at(9, 0), at(9, 20), OFFICE, stop),
        seg(at(9, 22), at(9, 50), stop, OFFICE),
    ];

    let day = TimelineBuilder::new().build_day(date(), &segments, &[], &technician());

    assert!(day.events.iter().any(|e| e.kind() == "arrived_unknown"));
}

#[test]
fn test_empty_day_is_terminal_state_not_error() {
    let day = TimelineBuilder::new().build_day(date(), &[], &[], &technician());

    assert!(day.events.is_empty());
    assert_eq!(day.job_count, 0);
    assert_eq!(day.office_visit_count, 0);
    assert_eq!(day.total_drive_minutes, 0);
    assert_eq!(day.first_job_on_time, None);
    assert_eq!(day.first_job_variance_minutes, None);
    assert_eq!(day.day_of_week, "Monday");
}

#[test]
fn test_first_segment_from_home_emits_left_home() {
    let segments = vec![seg(at(13, 0), at(13, 40), home(), job_a_site())];
    let jobs = vec![job_a(at(13, 30))];

    let day = TimelineBuilder::new().build_day(date(), &segments, &jobs, &take_home_technician());

    assert_eq!(day.events[0].kind(), "left_home");
    assert_eq!(day.events[0].timestamp(), at(13, 0));
}

#[test]
fn test_unclassified_origin_emits_no_left_event() {
    let somewhere = offset_north(&OFFICE, 200_000.0);
    let segments = vec![seg(at(9, 0), at(9, 40), somewhere, OFFICE)];

    let day = TimelineBuilder::new().build_day(date(), &segments, &[], &technician());

    assert_eq!(day.events.len(), 1);
    assert_eq!(day.events[0].kind(), "arrived_office");
}

#[test]
fn test_office_stop_before_first_job_from_home_is_unnecessary() {
    let segments = vec![
        seg(at(13, 0), at(13, 30), home(), OFFICE),
        seg(at(14, 0), at(14, 40), OFFICE, job_a_site()),
    ];
    let jobs = vec![job_a(at(15, 0))];

    let day = TimelineBuilder::new().build_day(date(), &segments, &jobs, &take_home_technician());

    let arrived_office = day
        .events
        .iter()
        .find(|e| e.kind() == "arrived_office")
        .expect("office arrival");
    match arrived_office {
        TimelineEvent::ArrivedOffice { is_unnecessary, .. } => assert!(is_unnecessary),
        _ => unreachable!(),
    }
}

#[test]
fn test_office_stop_from_office_start_is_not_unnecessary() {
    let segments = vec![
        seg(at(13, 0), at(13, 30), OFFICE, OFFICE),
        seg(at(14, 0), at(14, 40), OFFICE, job_a_site()),
    ];
    let jobs = vec![job_a(at(15, 0))];

    let day = TimelineBuilder::new().build_day(date(), &segments, &jobs, &technician());

    let arrived_office = day
        .events
        .iter()
        .find(|e| e.kind() == "arrived_office")
        .expect("office arrival");
    match arrived_office {
        TimelineEvent::ArrivedOffice { is_unnecessary, .. } => assert!(!is_unnecessary),
        _ => unreachable!(),
    }
}

#[test]
fn test_day_summary_is_set_by_first_arrival_only() {
    // Two visits to the first job: 5 minutes late, then a return visit much
    // later. The summary keeps the first arrival's variance.
    let segments = vec![
        seg(at(8, 30), at(9, 5), OFFICE, job_a_site()),
        seg(at(10, 0), at(10, 30), job_a_site(), OFFICE),
        seg(at(12, 0), at(12, 30), OFFICE, job_a_site()),
        seg(at(13, 0), at(13, 30), job_a_site(), OFFICE),
    ];
    let jobs = vec![job_a(at(9, 0))];

    let day = TimelineBuilder::new().build_day(date(), &segments, &jobs, &technician());

    assert_eq!(day.job_count, 2);
    assert_eq!(day.first_job_variance_minutes, Some(5));
    assert_eq!(day.first_job_on_time, Some(false));

    // The return visit still carries its own variance.
    let second_arrival = day
        .events
        .iter()
        .filter_map(|e| match e {
            TimelineEvent::ArrivedJob {
                variance_minutes, ..
            } => Some(*variance_minutes),
            _ => None,
        })
        .nth(1)
        .expect("second job arrival");
    assert_eq!(second_arrival, 210);
}

#[test]
fn test_unordered_segments_are_sorted() {
    let unknown_stop = offset_north(&job_a_site(), 600.0);
    let mut segments = vec![
        seg(at(8, 30), at(9, 5), OFFICE, job_a_site()),
        seg(at(10, 30), at(10, 50), job_a_site(), unknown_stop),
        seg(at(16, 45), at(17, 15), unknown_stop, OFFICE),
    ];
    segments.reverse();

    let day = TimelineBuilder::new().build_day(date(), &segments, &[job_a(at(9, 0))], &technician());

    assert_eq!(day.events[0].kind(), "left_office");
    assert_eq!(day.first_job_variance_minutes, Some(5));
}

#[test]
fn test_segment_without_resolved_end_contributes_no_arrival() {
    let somewhere = offset_north(&OFFICE, 200_000.0);
    let mut unfinished = seg(at(9, 0), at(9, 30), somewhere, somewhere);
    unfinished.end_time = None;
    unfinished.end_point = None;
    unfinished.end_address = None;
    unfinished.complete = false;

    let segments = vec![unfinished, seg(at(10, 0), at(10, 30), somewhere, OFFICE)];

    let day = TimelineBuilder::new().build_day(date(), &segments, &[], &technician());

    let kinds: Vec<&str> = day.events.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec!["arrived_office"]);
    assert_eq!(day.total_drive_minutes, 30);
}

#[test]
fn test_job_without_site_leaves_stop_unknown() {
    let stop = offset_north(&OFFICE, 40_000.0);
    let mut job = job_a(at(9, 0));
    job.site = None;

    let segments = vec![
        seg(at(8, 30), at(9, 5), OFFICE, stop),
        seg(at(10, 0), at(10, 30), stop, OFFICE),
    ];

    let day = TimelineBuilder::new().build_day(date(), &segments, &[job], &technician());

    assert_eq!(day.job_count, 0);
    assert!(day.events.iter().any(|e| e.kind() == "arrived_unknown"));
    assert_eq!(day.first_job_on_time, None);
}

#[test]
fn test_custom_location_stop() {
    let yard = offset_north(&OFFICE, 40_000.0);
    let mut tech = technician();
    tech.custom_locations.push(CustomLocation {
        name: "Supply house".to_string(),
        category: "supplier".to_string(),
        boundary: LocationBoundary::Circle {
            center: yard,
            radius_feet: 400.0,
        },
    });

    let segments = vec![
        seg(at(9, 0), at(9, 30), OFFICE, yard),
        seg(at(10, 0), at(10, 30), yard, OFFICE),
    ];

    let day = TimelineBuilder::new().build_day(date(), &segments, &[], &tech);

    let kinds: Vec<&str> = day.events.iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec!["left_office", "arrived_custom", "left_custom", "arrived_office"]
    );

    match &day.events[1] {
        TimelineEvent::ArrivedCustom { name, category, .. } => {
            assert_eq!(name, "Supply house");
            assert_eq!(category, "supplier");
        }
        other => panic!("expected arrived_custom, got {other:?}"),
    }
}

#[test]
fn test_left_events_never_precede_arrivals() {
    let unknown_stop = offset_north(&job_a_site(), 600.0);
    let segments = vec![
        seg(at(8, 30), at(9, 5), OFFICE, job_a_site()),
        seg(at(10, 30), at(10, 50), job_a_site(), unknown_stop),
        seg(at(16, 45), at(17, 15), unknown_stop, OFFICE),
    ];

    let day =
        TimelineBuilder::new().build_day(date(), &segments, &[job_a(at(9, 0))], &technician());

    for window in day.events.windows(2) {
        assert!(window[0].timestamp() <= window[1].timestamp());
    }
}

#[test]
fn test_merge_events_interleaves_by_timestamp() {
    let segments = vec![seg(at(9, 0), at(9, 40), OFFICE, job_a_site())];
    let day = TimelineBuilder::new().build_day(date(), &segments, &[job_a(at(9, 30))], &technician());

    let external = vec![
        TimelineEvent::ClockIn { time: at(8, 55) },
        TimelineEvent::MealStart { time: at(12, 0) },
        TimelineEvent::MealEnd { time: at(12, 30) },
    ];

    let merged = merge_events(day.events, external);

    assert_eq!(merged[0].kind(), "clock_in");
    assert_eq!(merged[1].kind(), "left_office");
    assert_eq!(merged.last().map(|e| e.kind()), Some("meal_end"));

    for window in merged.windows(2) {
        assert!(window[0].timestamp() <= window[1].timestamp());
    }
}

#[test]
fn test_custom_config_threshold() {
    // Raising the unknown-stop minimum filters a 5-minute dwell.
    let stop = offset_north(&OFFICE, 40_000.0);
    let segments = vec![
        seg(at(9, 0), at(9, 20), OFFICE, stop),
        seg(at(9, 25), at(9, 50), stop, OFFICE),
    ];

    let config = EngineConfig {
        min_unknown_stop_minutes: 10,
        ..EngineConfig::default()
    };
    let day = TimelineBuilder::with_config(config).build_day(date(), &segments, &[], &technician());

    assert!(!day.events.iter().any(|e| e.kind() == "arrived_unknown"));
}
