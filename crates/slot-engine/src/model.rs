//! Read model: the schedule rows the engine consumes.
//!
//! These mirror what the storage layer keeps for each expert. The engine only
//! ever reads them and derives [`TimeWindow`]s from them.

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::window::TimeWindow;

pub type ExpertId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expert {
    pub id: ExpertId,
    pub name: String,
    /// IANA timezone of the expert's working hours. Falls back to the
    /// configured default when absent.
    #[serde(default)]
    pub time_zone: Option<String>,
}

/// How an [`AvailabilityRule`] repeats. Only weekly rules exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleRecurrence {
    #[default]
    Weekly,
}

/// A recurring block of working hours on one weekday, in local wall-clock time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    pub expert_id: ExpertId,
    /// 0 = Monday .. 6 = Sunday.
    pub day_of_week: u8,
    pub start_time_of_day: NaiveTime,
    pub end_time_of_day: NaiveTime,
    #[serde(default)]
    pub recurrence: RuleRecurrence,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AvailabilityRule {
    pub fn weekday(&self) -> Result<Weekday> {
        weekday_from_index(self.day_of_week)
    }

    pub fn validate(&self) -> Result<()> {
        self.weekday()?;
        if self.start_time_of_day >= self.end_time_of_day {
            return Err(EngineError::InvalidRule(format!(
                "expert {} day {}: start {} is not before end {}",
                self.expert_id, self.day_of_week, self.start_time_of_day, self.end_time_of_day
            )));
        }
        Ok(())
    }
}

/// Whether an [`UnavailabilityException`] happens once or every week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionRecurrence {
    /// A single absolute interval.
    #[default]
    #[serde(rename = "none")]
    Once,
    /// Repeats on the weekday and local time-of-day of `start_time`, forever.
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnavailabilityException {
    pub expert_id: ExpertId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub recurrence: ExceptionRecurrence,
}

impl UnavailabilityException {
    /// The first (or only) occurrence.
    pub fn window(&self) -> Result<TimeWindow> {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Identifier issued by the calendar provider.
    pub event_id: String,
    pub user_id: UserId,
    pub expert_id: ExpertId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub purpose: Option<String>,
}

impl Appointment {
    pub fn is_scheduled(&self) -> bool {
        self.status == AppointmentStatus::Scheduled
    }

    pub fn window(&self) -> Result<TimeWindow> {
        TimeWindow::new(self.start_time, self.end_time)
    }

    /// Half-open overlap against `window`; touching does not count.
    pub fn overlaps(&self, window: &TimeWindow) -> bool {
        self.start_time < window.end() && window.start() < self.end_time
    }
}

/// Map `0 = Monday .. 6 = Sunday` onto [`Weekday`].
pub fn weekday_from_index(index: u8) -> Result<Weekday> {
    let weekday = match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        6 => Weekday::Sun,
        other => {
            return Err(EngineError::InvalidRule(format!(
                "day_of_week must be 0..=6, got {}",
                other
            )))
        }
    };
    Ok(weekday)
}
