//! The public face of the engine: a [`Scheduler`] over a [`ScheduleStore`].
//!
//! Each call fetches the rows it needs for the queried range once, builds an
//! [`ExpertSchedule`] snapshot, and answers from that snapshot. The scheduler
//! holds no mutable state, so it can be shared across threads freely.
//!
//! Bookability is a check: it does not reserve anything. Two concurrent callers
//! can both see the same slot as bookable, so the storage layer must serialize
//! the final insert per expert and report a late conflict as "slot no longer
//! available".

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::availability::EffectiveAvailability;
use crate::config::EngineConfig;
use crate::conflict::AppointmentConflict;
use crate::error::{EngineError, Result};
use crate::expander::{Horizon, LocalCalendar};
use crate::model::ExpertId;
use crate::schedule::ExpertSchedule;
use crate::store::ScheduleStore;
use crate::suggest::{ScanSettings, SuggestRequest};
use crate::window::TimeWindow;

/// Why a requested window cannot be booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableReason {
    /// Not fully inside a single effective availability window.
    OutsideAvailability,
    /// Overlaps an existing Scheduled appointment.
    Conflict,
}

/// Verdict for a booking request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingDecision {
    Bookable,
    Unavailable {
        reason: UnavailableReason,
        /// The nearest bookable windows of the same duration, earliest first.
        alternatives: Vec<TimeWindow>,
    },
}

impl BookingDecision {
    pub fn is_bookable(&self) -> bool {
        matches!(self, BookingDecision::Bookable)
    }
}

pub struct Scheduler<S> {
    store: S,
    config: EngineConfig,
}

impl<S: ScheduleStore> Scheduler<S> {
    /// # Errors
    /// Returns the first validation error of `config`.
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn with_defaults(store: S) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The local calendar the expert's rules are written in.
    pub fn calendar_for(&self, expert_id: ExpertId) -> Result<LocalCalendar> {
        let tz = match self.store.expert(expert_id)? {
            Some(expert) => match expert.time_zone.as_deref() {
                Some(name) => crate::boundary::parse_timezone(name)?,
                None => self.config.timezone()?,
            },
            None => {
                tracing::debug!(expert_id, "expert unknown to store, using default timezone");
                self.config.timezone()?
            }
        };
        Ok(LocalCalendar::new(tz, self.config.dst_policy))
    }

    /// Fetch everything that can affect `range` for one expert.
    pub fn load(&self, expert_id: ExpertId, range: &TimeWindow) -> Result<ExpertSchedule> {
        let calendar = self.calendar_for(expert_id)?;
        let schedule = ExpertSchedule::new(expert_id, calendar)
            .with_rules(self.store.list_active_availability_rules(expert_id)?)
            .with_exceptions(self.store.list_unavailability_exceptions(expert_id, range)?)
            .with_appointments(self.store.list_scheduled_appointments(expert_id, range)?)
            .with_max_horizon_days(self.config.max_horizon_days);
        Ok(schedule)
    }

    /// Effective availability over `[start, end)`.
    ///
    /// # Errors
    /// `InvalidHorizon` if the range is empty or longer than `max_horizon_days`.
    pub fn resolve(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<EffectiveAvailability> {
        let horizon = self.horizon(start, end)?;
        self.load(expert_id, &horizon.window())?.resolve(&horizon)
    }

    /// Effective availability for `default_horizon_days` from `start`.
    pub fn resolve_default(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
    ) -> Result<EffectiveAvailability> {
        let end = start
            .checked_add_signed(Duration::days(self.config.default_horizon_days))
            .ok_or_else(|| {
                EngineError::InvalidHorizon(format!(
                    "{} days from {} is out of range",
                    self.config.default_horizon_days, start
                ))
            })?;
        self.resolve(expert_id, start, end)
    }

    /// # Errors
    /// `InvalidWindow` if `start >= end`.
    pub fn is_within_availability(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        let request = TimeWindow::new(start, end)?;
        self.horizon(start, end)?;
        let within = self
            .load(expert_id, &request)?
            .is_within_availability(&request)?;
        tracing::debug!(expert_id, %start, %end, within, "availability check");
        Ok(within)
    }

    /// # Errors
    /// `InvalidWindow` if `start >= end`.
    pub fn has_conflict(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        let request = TimeWindow::new(start, end)?;
        let appointments = self.store.list_scheduled_appointments(expert_id, &request)?;
        let conflict = crate::conflict::has_conflict(&appointments, expert_id, &request);
        tracing::debug!(expert_id, %start, %end, conflict, "conflict check");
        Ok(conflict)
    }

    pub fn conflicting_appointments(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AppointmentConflict>> {
        let request = TimeWindow::new(start, end)?;
        let appointments = self.store.list_scheduled_appointments(expert_id, &request)?;
        Ok(crate::conflict::find_conflicts(
            &appointments,
            expert_id,
            &request,
        ))
    }

    pub fn is_bookable(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self.is_within_availability(expert_id, start, end)?
            && !self.has_conflict(expert_id, start, end)?)
    }

    /// Next `limit` bookable windows of `duration_minutes` at or after `desired_start`.
    pub fn suggest_next_available_slots(
        &self,
        expert_id: ExpertId,
        desired_start: DateTime<Utc>,
        duration_minutes: i64,
        limit: usize,
    ) -> Result<Vec<TimeWindow>> {
        self.suggest(
            &SuggestRequest::new(expert_id, desired_start)
                .with_duration(duration_minutes)
                .with_limit(limit),
        )
    }

    pub fn suggest(&self, request: &SuggestRequest) -> Result<Vec<TimeWindow>> {
        let settings = ScanSettings::from(&self.config);
        settings.validate()?;
        let first = TimeWindow::starting_at(request.desired_start, request.duration_minutes)?;
        let range_end = first
            .end()
            .checked_add_signed(Duration::days(settings.max_lookahead_days))
            .ok_or_else(|| {
                EngineError::InvalidHorizon(format!(
                    "lookahead of {} days from {} is out of range",
                    settings.max_lookahead_days, request.desired_start
                ))
            })?;
        let range = TimeWindow::new(request.desired_start, range_end)?;
        let slots = self.load(request.expert_id, &range)?.suggest(request, &settings)?;
        tracing::info!(
            expert_id = request.expert_id,
            desired_start = %request.desired_start,
            duration_minutes = request.duration_minutes,
            found = slots.len(),
            "suggested slots"
        );
        Ok(slots)
    }

    /// Decide whether `[start, end)` can be booked, with alternatives when not.
    pub fn check_booking(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BookingDecision> {
        let request = TimeWindow::new(start, end)?;
        let reason = if !self.is_within_availability(expert_id, start, end)? {
            UnavailableReason::OutsideAvailability
        } else if self.has_conflict(expert_id, start, end)? {
            UnavailableReason::Conflict
        } else {
            tracing::info!(expert_id, %start, %end, "requested window is bookable");
            return Ok(BookingDecision::Bookable);
        };

        let alternatives = self.suggest(
            &SuggestRequest::new(expert_id, start)
                .with_duration(request.duration_minutes().max(1))
                .with_limit(self.config.default_suggestion_limit),
        )?;
        tracing::info!(
            expert_id,
            %start,
            %end,
            ?reason,
            alternatives = alternatives.len(),
            "requested window is not bookable"
        );
        Ok(BookingDecision::Unavailable {
            reason,
            alternatives,
        })
    }

    /// Effective availability minus Scheduled appointments over `[start, end)`.
    pub fn free_windows(
        &self,
        expert_id: ExpertId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TimeWindow>> {
        let horizon = self.horizon(start, end)?;
        self.load(expert_id, &horizon.window())?
            .free_windows(&horizon)
    }

    fn horizon(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Horizon> {
        Horizon::new(start, end, self.config.max_horizon_days)
    }
}
