//! Effective availability: working-hour rules minus unavailability exceptions.
//!
//! Rules are expanded and merged into candidate windows, exceptions are expanded
//! and merged into blocked windows, and every blocked window is carved out of
//! every candidate. The result is the ordered, non-overlapping set of windows
//! during which the expert can be booked (before appointments are considered).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expander::{self, Horizon, LocalCalendar};
use crate::model::{AvailabilityRule, ExpertId, UnavailabilityException};
use crate::window::{self, TimeWindow};

/// Derived availability for one expert over a bounded range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveAvailability {
    pub expert_id: ExpertId,
    /// The range that was resolved.
    pub range: TimeWindow,
    /// Sorted by start, non-overlapping, never empty-length.
    pub windows: Vec<TimeWindow>,
}

impl EffectiveAvailability {
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// The single effective window that fully contains `request`, if any.
    pub fn window_containing(&self, request: &TimeWindow) -> Option<&TimeWindow> {
        self.windows.iter().find(|w| w.contains(request))
    }

    pub fn contains(&self, request: &TimeWindow) -> bool {
        self.window_containing(request).is_some()
    }

    /// Effective windows clipped to the resolved range.
    pub fn clipped(&self) -> Vec<TimeWindow> {
        self.windows
            .iter()
            .filter_map(|w| w.intersection(&self.range))
            .collect()
    }
}

/// Resolve the effective availability of `expert_id` over `horizon`.
///
/// Inactive rules and rows belonging to other experts are ignored. An expert
/// with no active rules resolves to an empty (never available) result.
///
/// # Errors
/// Propagates malformed rule (`InvalidRule`) and exception (`InvalidWindow`)
/// errors from expansion.
pub fn resolve_availability(
    expert_id: ExpertId,
    rules: &[AvailabilityRule],
    exceptions: &[UnavailabilityException],
    calendar: &LocalCalendar,
    horizon: &Horizon,
) -> Result<EffectiveAvailability> {
    let mut candidates = Vec::new();
    for rule in rules
        .iter()
        .filter(|r| r.active && r.expert_id == expert_id)
    {
        candidates.extend(expander::expand_rule(rule, calendar, horizon)?);
    }
    let candidates = window::merge(candidates);

    let mut blocked = Vec::new();
    if !candidates.is_empty() {
        for exception in exceptions.iter().filter(|e| e.expert_id == expert_id) {
            blocked.extend(expander::expand_exception(exception, calendar, horizon)?);
        }
    }
    let blocked = window::merge(blocked);

    let windows = window::merge_sorted(&window::subtract_all(&candidates, &blocked));

    tracing::debug!(
        expert_id,
        candidates = candidates.len(),
        blocked = blocked.len(),
        effective = windows.len(),
        "resolved availability"
    );

    Ok(EffectiveAvailability {
        expert_id,
        range: horizon.window(),
        windows,
    })
}
