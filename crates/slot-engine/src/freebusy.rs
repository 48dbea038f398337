//! Free windows: effective availability minus booked appointments.
//!
//! Busy periods are the expert's Scheduled appointments clipped to the resolved
//! range and merged; the free windows are what remains of each effective window
//! once every busy period is removed.

use crate::availability::EffectiveAvailability;
use crate::model::Appointment;
use crate::window::{self, TimeWindow};

/// Merge the expert's Scheduled appointments into busy periods within `range`.
///
/// Appointments with an empty or inverted interval are ignored.
pub fn busy_periods(
    appointments: &[Appointment],
    availability: &EffectiveAvailability,
) -> Vec<TimeWindow> {
    let busy: Vec<TimeWindow> = appointments
        .iter()
        .filter(|a| a.expert_id == availability.expert_id && a.is_scheduled())
        .filter_map(|a| a.window().ok())
        .filter_map(|w| w.intersection(&availability.range))
        .collect();

    window::merge(busy)
}

/// Bookable free time within the resolved range, sorted by start.
pub fn free_windows(
    appointments: &[Appointment],
    availability: &EffectiveAvailability,
) -> Vec<TimeWindow> {
    let busy = busy_periods(appointments, availability);
    window::subtract_all(&availability.clipped(), &busy)
}

/// The first free window of at least `min_duration_minutes`.
pub fn first_free_window(
    appointments: &[Appointment],
    availability: &EffectiveAvailability,
    min_duration_minutes: i64,
) -> Option<TimeWindow> {
    free_windows(appointments, availability)
        .into_iter()
        .find(|w| w.duration_minutes() >= min_duration_minutes)
}
