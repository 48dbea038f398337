//! One expert's schedule snapshot and the pure operations over it.
//!
//! An [`ExpertSchedule`] holds already-fetched rules, exceptions and
//! appointments. Every answer it gives is a deterministic function of that
//! snapshot; nothing here performs I/O or mutates the rows it holds.

use crate::availability::{self, EffectiveAvailability};
use crate::config::EngineConfig;
use crate::conflict::{self, AppointmentConflict};
use crate::error::Result;
use crate::expander::{Horizon, LocalCalendar};
use crate::freebusy;
use crate::model::{Appointment, AvailabilityRule, ExpertId, UnavailabilityException};
use crate::suggest::{self, ScanSettings, SuggestRequest};
use crate::window::TimeWindow;

#[derive(Debug, Clone)]
pub struct ExpertSchedule {
    pub expert_id: ExpertId,
    pub calendar: LocalCalendar,
    pub rules: Vec<AvailabilityRule>,
    pub exceptions: Vec<UnavailabilityException>,
    pub appointments: Vec<Appointment>,
    /// Longest request `is_within_availability` will expand rules over.
    pub max_horizon_days: i64,
}

impl ExpertSchedule {
    pub fn new(expert_id: ExpertId, calendar: LocalCalendar) -> Self {
        Self {
            expert_id,
            calendar,
            rules: Vec::new(),
            exceptions: Vec::new(),
            appointments: Vec::new(),
            max_horizon_days: EngineConfig::default().max_horizon_days,
        }
    }

    pub fn with_rules(mut self, rules: Vec<AvailabilityRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_exceptions(mut self, exceptions: Vec<UnavailabilityException>) -> Self {
        self.exceptions = exceptions;
        self
    }

    pub fn with_appointments(mut self, appointments: Vec<Appointment>) -> Self {
        self.appointments = appointments;
        self
    }

    pub fn with_max_horizon_days(mut self, max_horizon_days: i64) -> Self {
        self.max_horizon_days = max_horizon_days;
        self
    }

    pub fn resolve(&self, horizon: &Horizon) -> Result<EffectiveAvailability> {
        availability::resolve_availability(
            self.expert_id,
            &self.rules,
            &self.exceptions,
            &self.calendar,
            horizon,
        )
    }

    /// Resolve over exactly the requested window and test single-window containment.
    ///
    /// # Errors
    /// `InvalidHorizon` if the request is longer than `max_horizon_days`.
    pub fn is_within_availability(&self, request: &TimeWindow) -> Result<bool> {
        let horizon = Horizon::new(request.start(), request.end(), self.max_horizon_days)?;
        let effective = self.resolve(&horizon)?;
        Ok(conflict::is_within_availability(&effective, request))
    }

    pub fn has_conflict(&self, request: &TimeWindow) -> bool {
        conflict::has_conflict(&self.appointments, self.expert_id, request)
    }

    pub fn conflicts(&self, request: &TimeWindow) -> Vec<AppointmentConflict> {
        conflict::find_conflicts(&self.appointments, self.expert_id, request)
    }

    pub fn is_bookable(&self, request: &TimeWindow) -> Result<bool> {
        Ok(self.is_within_availability(request)? && !self.has_conflict(request))
    }

    pub fn suggest(
        &self,
        request: &SuggestRequest,
        settings: &ScanSettings,
    ) -> Result<Vec<TimeWindow>> {
        suggest::suggest_slots(self, request, settings)
    }

    pub fn free_windows(&self, horizon: &Horizon) -> Result<Vec<TimeWindow>> {
        let effective = self.resolve(horizon)?;
        Ok(freebusy::free_windows(&self.appointments, &effective))
    }
}
