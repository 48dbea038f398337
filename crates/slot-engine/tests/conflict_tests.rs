//! Tests for availability containment and appointment conflicts.

use chrono::{DateTime, TimeZone, Utc};
use slot_engine::conflict::{find_conflicts, has_conflict};
use slot_engine::dst::DstPolicy;
use slot_engine::expander::LocalCalendar;
use slot_engine::model::{
    Appointment, AppointmentStatus, AvailabilityRule, ExceptionRecurrence, RuleRecurrence,
    UnavailabilityException,
};
use slot_engine::{EngineError, ExpertSchedule, TimeWindow};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    chrono_tz::Asia::Kolkata
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// A request on Monday 2026-03-16, local time.
fn monday(sh: u32, sm: u32, eh: u32, em: u32) -> TimeWindow {
    TimeWindow::new(ist(2026, 3, 16, sh, sm), ist(2026, 3, 16, eh, em)).unwrap()
}

fn appointment(
    event_id: &str,
    expert_id: i64,
    window: TimeWindow,
    status: AppointmentStatus,
) -> Appointment {
    Appointment {
        event_id: event_id.to_string(),
        user_id: 7,
        expert_id,
        start_time: window.start(),
        end_time: window.end(),
        status,
        purpose: Some("consultation".to_string()),
    }
}

fn weekday_expert() -> ExpertSchedule {
    let rules = (0..5)
        .map(|day| AvailabilityRule {
            expert_id: 1,
            day_of_week: day,
            start_time_of_day: "10:00:00".parse().unwrap(),
            end_time_of_day: "17:00:00".parse().unwrap(),
            recurrence: RuleRecurrence::Weekly,
            active: true,
        })
        .collect();
    ExpertSchedule::new(
        1,
        LocalCalendar::new(chrono_tz::Asia::Kolkata, DstPolicy::ShiftForward),
    )
    .with_rules(rules)
}

// ── Appointment overlap ─────────────────────────────────────────────────────

#[test]
fn overlapping_scheduled_appointment_is_a_conflict() {
    let booked = vec![appointment(
        "evt-1",
        1,
        monday(11, 0, 11, 30),
        AppointmentStatus::Scheduled,
    )];
    assert!(has_conflict(&booked, 1, &monday(11, 15, 11, 45)));
    assert!(has_conflict(&booked, 1, &monday(10, 0, 17, 0)));
}

#[test]
fn adjacent_appointment_is_not_a_conflict() {
    let booked = vec![appointment(
        "evt-1",
        1,
        monday(11, 0, 11, 30),
        AppointmentStatus::Scheduled,
    )];
    assert!(!has_conflict(&booked, 1, &monday(11, 30, 12, 0)));
    assert!(!has_conflict(&booked, 1, &monday(10, 30, 11, 0)));
}

#[test]
fn cancelled_appointment_is_ignored() {
    let booked = vec![appointment(
        "evt-1",
        1,
        monday(11, 0, 11, 30),
        AppointmentStatus::Cancelled,
    )];
    assert!(!has_conflict(&booked, 1, &monday(11, 0, 11, 30)));
    assert!(find_conflicts(&booked, 1, &monday(11, 0, 11, 30)).is_empty());
}

#[test]
fn other_experts_appointments_are_ignored() {
    let booked = vec![appointment(
        "evt-1",
        2,
        monday(11, 0, 11, 30),
        AppointmentStatus::Scheduled,
    )];
    assert!(!has_conflict(&booked, 1, &monday(11, 0, 11, 30)));
}

#[test]
fn conflicts_report_overlap_minutes() {
    let booked = vec![
        appointment("evt-1", 1, monday(10, 0, 11, 0), AppointmentStatus::Scheduled),
        appointment("evt-2", 1, monday(11, 30, 12, 0), AppointmentStatus::Scheduled),
        appointment("evt-3", 1, monday(14, 0, 15, 0), AppointmentStatus::Scheduled),
    ];

    let conflicts = find_conflicts(&booked, 1, &monday(10, 45, 11, 45));

    assert_eq!(conflicts.len(), 2);
    assert_eq!(conflicts[0].appointment.event_id, "evt-1");
    assert_eq!(conflicts[0].overlap_minutes, 15);
    assert_eq!(conflicts[1].appointment.event_id, "evt-2");
    assert_eq!(conflicts[1].overlap_minutes, 15);
}

// ── Availability containment ────────────────────────────────────────────────

#[test]
fn request_inside_working_hours_is_within_availability() {
    let expert = weekday_expert();
    assert!(expert.is_within_availability(&monday(11, 0, 11, 30)).unwrap());
    assert!(expert.is_within_availability(&monday(10, 0, 17, 0)).unwrap());
}

#[test]
fn request_straddling_end_of_day_is_not_within() {
    let expert = weekday_expert();
    assert!(!expert.is_within_availability(&monday(16, 45, 17, 15)).unwrap());
    assert!(!expert.is_within_availability(&monday(9, 45, 10, 15)).unwrap());
}

#[test]
fn request_spanning_an_exception_gap_is_not_within() {
    let expert = weekday_expert().with_exceptions(vec![UnavailabilityException {
        expert_id: 1,
        start_time: ist(2026, 3, 16, 12, 0),
        end_time: ist(2026, 3, 16, 13, 0),
        reason: Some("lunch".to_string()),
        recurrence: ExceptionRecurrence::Once,
    }]);

    // Both halves are free working time, but no single window contains the request.
    assert!(expert.is_within_availability(&monday(11, 0, 12, 0)).unwrap());
    assert!(expert.is_within_availability(&monday(13, 0, 14, 0)).unwrap());
    assert!(!expert.is_within_availability(&monday(11, 30, 13, 30)).unwrap());
}

#[test]
fn unknown_expert_data_is_simply_unavailable() {
    let nobody = ExpertSchedule::new(
        99,
        LocalCalendar::new(chrono_tz::Asia::Kolkata, DstPolicy::ShiftForward),
    );
    assert!(!nobody.is_within_availability(&monday(11, 0, 11, 30)).unwrap());
    assert!(!nobody.has_conflict(&monday(11, 0, 11, 30)));
}

#[test]
fn request_longer_than_the_horizon_cap_is_rejected() {
    let schedule = weekday_expert();
    let long = TimeWindow::new(ist(2026, 3, 16, 10, 0), ist(2026, 10, 2, 10, 0)).unwrap();
    assert!(matches!(
        schedule.is_within_availability(&long),
        Err(EngineError::InvalidHorizon(_))
    ));
    assert!(matches!(
        schedule.is_bookable(&long),
        Err(EngineError::InvalidHorizon(_))
    ));

    // A tighter cap applies to short requests too.
    let capped = weekday_expert().with_max_horizon_days(1);
    let two_days = TimeWindow::new(ist(2026, 3, 16, 10, 0), ist(2026, 3, 18, 10, 0)).unwrap();
    assert!(matches!(
        capped.is_within_availability(&two_days),
        Err(EngineError::InvalidHorizon(_))
    ));
    assert!(capped.is_within_availability(&monday(11, 0, 11, 30)).unwrap());
}

// ── Bookability ─────────────────────────────────────────────────────────────

#[test]
fn bookable_requires_availability_and_no_conflict() {
    let expert = weekday_expert().with_appointments(vec![appointment(
        "evt-1",
        1,
        monday(11, 0, 11, 30),
        AppointmentStatus::Scheduled,
    )]);

    assert!(expert.is_bookable(&monday(11, 30, 12, 0)).unwrap());
    assert!(!expert.is_bookable(&monday(11, 15, 11, 45)).unwrap());
    assert!(!expert.is_bookable(&monday(17, 0, 17, 30)).unwrap());
    assert_eq!(expert.conflicts(&monday(11, 15, 11, 45)).len(), 1);
}
