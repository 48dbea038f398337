//! The read-only data-access seam the engine consumes.
//!
//! A storage layer implements [`ScheduleStore`]; the engine never writes
//! through it. [`ScheduleSnapshot`] is an in-memory implementation backed by a
//! JSON document, used by the CLI and tests.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::{
    Appointment, AvailabilityRule, ExceptionRecurrence, Expert, ExpertId, UnavailabilityException,
};
use crate::window::TimeWindow;

/// Read-only access to an expert's schedule rows.
///
/// Absence is not an error: an unknown expert yields `Ok(None)` / empty lists.
/// A store that wants unknown experts rejected may return
/// [`EngineError::ExpertNotFound`], which the engine propagates unchanged.
pub trait ScheduleStore: Send + Sync {
    fn expert(&self, expert_id: ExpertId) -> Result<Option<Expert>>;

    fn list_active_availability_rules(&self, expert_id: ExpertId)
        -> Result<Vec<AvailabilityRule>>;

    /// Exceptions that can affect `range`: one-off exceptions overlapping it,
    /// and weekly exceptions that started before it ends.
    fn list_unavailability_exceptions(
        &self,
        expert_id: ExpertId,
        range: &TimeWindow,
    ) -> Result<Vec<UnavailabilityException>>;

    /// Scheduled appointments overlapping `range`.
    fn list_scheduled_appointments(
        &self,
        expert_id: ExpertId,
        range: &TimeWindow,
    ) -> Result<Vec<Appointment>>;
}

impl<T: ScheduleStore + ?Sized> ScheduleStore for Arc<T> {
    fn expert(&self, expert_id: ExpertId) -> Result<Option<Expert>> {
        (**self).expert(expert_id)
    }

    fn list_active_availability_rules(
        &self,
        expert_id: ExpertId,
    ) -> Result<Vec<AvailabilityRule>> {
        (**self).list_active_availability_rules(expert_id)
    }

    fn list_unavailability_exceptions(
        &self,
        expert_id: ExpertId,
        range: &TimeWindow,
    ) -> Result<Vec<UnavailabilityException>> {
        (**self).list_unavailability_exceptions(expert_id, range)
    }

    fn list_scheduled_appointments(
        &self,
        expert_id: ExpertId,
        range: &TimeWindow,
    ) -> Result<Vec<Appointment>> {
        (**self).list_scheduled_appointments(expert_id, range)
    }
}

/// Every schedule row, held in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSnapshot {
    pub experts: Vec<Expert>,
    pub availability: Vec<AvailabilityRule>,
    pub unavailability: Vec<UnavailabilityException>,
    pub appointments: Vec<Appointment>,
}

impl ScheduleSnapshot {
    /// Parse a snapshot from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::Store(format!("invalid snapshot: {}", e)))
    }
}

impl ScheduleStore for ScheduleSnapshot {
    fn expert(&self, expert_id: ExpertId) -> Result<Option<Expert>> {
        Ok(self.experts.iter().find(|e| e.id == expert_id).cloned())
    }

    fn list_active_availability_rules(
        &self,
        expert_id: ExpertId,
    ) -> Result<Vec<AvailabilityRule>> {
        Ok(self
            .availability
            .iter()
            .filter(|r| r.expert_id == expert_id && r.active)
            .cloned()
            .collect())
    }

    fn list_unavailability_exceptions(
        &self,
        expert_id: ExpertId,
        range: &TimeWindow,
    ) -> Result<Vec<UnavailabilityException>> {
        Ok(self
            .unavailability
            .iter()
            .filter(|e| e.expert_id == expert_id)
            .filter(|e| match e.recurrence {
                ExceptionRecurrence::Once => {
                    e.start_time < range.end() && range.start() < e.end_time
                }
                ExceptionRecurrence::Weekly => e.start_time < range.end(),
            })
            .cloned()
            .collect())
    }

    fn list_scheduled_appointments(
        &self,
        expert_id: ExpertId,
        range: &TimeWindow,
    ) -> Result<Vec<Appointment>> {
        Ok(self
            .appointments
            .iter()
            .filter(|a| a.expert_id == expert_id && a.is_scheduled() && a.overlaps(range))
            .cloned()
            .collect())
    }
}
