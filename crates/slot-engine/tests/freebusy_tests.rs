//! Tests for free windows (effective availability minus appointments).

use chrono::{DateTime, TimeZone, Utc};
use slot_engine::availability::resolve_availability;
use slot_engine::dst::DstPolicy;
use slot_engine::expander::{Horizon, LocalCalendar};
use slot_engine::freebusy::{busy_periods, first_free_window, free_windows};
use slot_engine::model::{Appointment, AppointmentStatus, AvailabilityRule, RuleRecurrence};
use slot_engine::{EffectiveAvailability, TimeWindow};

/// Monday 2026-03-16, local time.
fn ist(h: u32, min: u32) -> DateTime<Utc> {
    chrono_tz::Asia::Kolkata
        .with_ymd_and_hms(2026, 3, 16, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

fn window(sh: u32, sm: u32, eh: u32, em: u32) -> TimeWindow {
    TimeWindow::new(ist(sh, sm), ist(eh, em)).unwrap()
}

fn appointment(sh: u32, sm: u32, eh: u32, em: u32, status: AppointmentStatus) -> Appointment {
    Appointment {
        event_id: format!("evt-{}{}", sh, sm),
        user_id: 7,
        expert_id: 1,
        start_time: ist(sh, sm),
        end_time: ist(eh, em),
        status,
        purpose: None,
    }
}

/// Monday 10:00-17:00 resolved over `[start, end)`.
fn availability(start: DateTime<Utc>, end: DateTime<Utc>) -> EffectiveAvailability {
    let rule = AvailabilityRule {
        expert_id: 1,
        day_of_week: 0,
        start_time_of_day: "10:00:00".parse().unwrap(),
        end_time_of_day: "17:00:00".parse().unwrap(),
        recurrence: RuleRecurrence::Weekly,
        active: true,
    };
    resolve_availability(
        1,
        &[rule],
        &[],
        &LocalCalendar::new(chrono_tz::Asia::Kolkata, DstPolicy::ShiftForward),
        &Horizon::new(start, end, 90).unwrap(),
    )
    .unwrap()
}

#[test]
fn appointments_are_removed_from_availability() {
    let effective = availability(ist(0, 0), ist(23, 0));
    let booked = vec![
        appointment(11, 0, 12, 0, AppointmentStatus::Scheduled),
        appointment(14, 0, 14, 30, AppointmentStatus::Scheduled),
    ];

    let free = free_windows(&booked, &effective);

    assert_eq!(
        free,
        vec![
            window(10, 0, 11, 0),
            window(12, 0, 14, 0),
            window(14, 30, 17, 0),
        ]
    );
}

#[test]
fn overlapping_appointments_merge_into_one_busy_period() {
    let effective = availability(ist(0, 0), ist(23, 0));
    let booked = vec![
        appointment(11, 0, 12, 0, AppointmentStatus::Scheduled),
        appointment(11, 30, 13, 0, AppointmentStatus::Scheduled),
        appointment(13, 0, 13, 30, AppointmentStatus::Scheduled),
    ];

    assert_eq!(busy_periods(&booked, &effective), vec![window(11, 0, 13, 30)]);
}

#[test]
fn cancelled_appointments_leave_time_free() {
    let effective = availability(ist(0, 0), ist(23, 0));
    let booked = vec![appointment(11, 0, 12, 0, AppointmentStatus::Cancelled)];
    assert_eq!(free_windows(&booked, &effective), vec![window(10, 0, 17, 0)]);
}

#[test]
fn free_windows_are_clipped_to_the_range() {
    let effective = availability(ist(12, 0), ist(15, 0));
    let booked = vec![appointment(9, 0, 12, 30, AppointmentStatus::Scheduled)];
    assert_eq!(free_windows(&booked, &effective), vec![window(12, 30, 15, 0)]);
}

#[test]
fn first_free_window_respects_minimum_duration() {
    let effective = availability(ist(0, 0), ist(23, 0));
    let booked = vec![
        appointment(10, 30, 11, 0, AppointmentStatus::Scheduled),
        appointment(12, 0, 17, 0, AppointmentStatus::Scheduled),
    ];

    assert_eq!(
        first_free_window(&booked, &effective, 30),
        Some(window(10, 0, 10, 30))
    );
    assert_eq!(
        first_free_window(&booked, &effective, 45),
        Some(window(11, 0, 12, 0))
    );
    assert_eq!(first_free_window(&booked, &effective, 90), None);
}
