//! Conflict checks for a candidate appointment window.
//!
//! A request is bookable when one effective availability window contains it and
//! no Scheduled appointment of the same expert overlaps it. Adjacent
//! appointments (one ends exactly when the request starts) are NOT conflicts,
//! and Cancelled appointments never participate.

use serde::Serialize;

use crate::availability::EffectiveAvailability;
use crate::model::{Appointment, ExpertId};
use crate::window::TimeWindow;

/// A Scheduled appointment that overlaps a requested window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentConflict {
    pub appointment: Appointment,
    pub overlap_minutes: i64,
}

/// True iff a single effective window contains `request`.
///
/// A request straddling two separate windows is not within availability, even
/// if both halves are individually free.
pub fn is_within_availability(availability: &EffectiveAvailability, request: &TimeWindow) -> bool {
    availability.contains(request)
}

/// True iff any Scheduled appointment of `expert_id` overlaps `request`.
pub fn has_conflict(appointments: &[Appointment], expert_id: ExpertId, request: &TimeWindow) -> bool {
    appointments
        .iter()
        .any(|a| blocks(a, expert_id) && a.overlaps(request))
}

/// Every Scheduled appointment of `expert_id` overlapping `request`, with the
/// overlap duration `min(a.end, r.end) - max(a.start, r.start)`.
pub fn find_conflicts(
    appointments: &[Appointment],
    expert_id: ExpertId,
    request: &TimeWindow,
) -> Vec<AppointmentConflict> {
    appointments
        .iter()
        .filter(|a| blocks(a, expert_id) && a.overlaps(request))
        .map(|a| {
            let overlap_start = a.start_time.max(request.start());
            let overlap_end = a.end_time.min(request.end());
            AppointmentConflict {
                appointment: a.clone(),
                overlap_minutes: (overlap_end - overlap_start).num_minutes(),
            }
        })
        .collect()
}

fn blocks(appointment: &Appointment, expert_id: ExpertId) -> bool {
    appointment.expert_id == expert_id && appointment.is_scheduled()
}
