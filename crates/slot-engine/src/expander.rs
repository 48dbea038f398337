//! Recurrence expansion -- turns weekly rules and exceptions into concrete UTC windows.
//!
//! Weekday enumeration goes through the `rrule` crate (`FREQ=WEEKLY;BYDAY=..`);
//! wall-clock times are then placed in the expert's timezone with `chrono-tz`
//! and resolved through a [`DstPolicy`]. Expansion is always bounded by a
//! [`Horizon`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use rrule::RRuleSet;

use crate::dst::{self, DstPolicy};
use crate::error::{EngineError, Result};
use crate::model::{AvailabilityRule, ExceptionRecurrence, UnavailabilityException};
use crate::window::TimeWindow;

/// Upper bound on raw occurrences pulled from one RRULE.
const MAX_OCCURRENCES: u16 = 520;

/// A bounded `[start, end)` range over which recurrences are expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    window: TimeWindow,
}

impl Horizon {
    /// Build a horizon no longer than `max_days`.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidHorizon` if `start >= end` or the range is
    /// longer than `max_days`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>, max_days: i64) -> Result<Self> {
        let window = TimeWindow::new(start, end).map_err(|_| {
            EngineError::InvalidHorizon(format!("horizon start {} is not before end {}", start, end))
        })?;
        // A cap too large for a `Duration` bounds nothing.
        let within = max_days > 0
            && Duration::try_days(max_days).map_or(true, |max| window.duration() <= max);
        if !within {
            return Err(EngineError::InvalidHorizon(format!(
                "horizon of {} days exceeds the maximum of {} days",
                window.duration().num_days(),
                max_days
            )));
        }
        Ok(Self { window })
    }

    /// A horizon whose length the caller has already bounded.
    pub(crate) fn unchecked(window: TimeWindow) -> Self {
        Self { window }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.window.start()
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.window.end()
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }
}

/// The local calendar an expert's wall-clock rules live in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalCalendar {
    pub tz: Tz,
    pub dst_policy: DstPolicy,
}

impl LocalCalendar {
    pub fn new(tz: Tz, dst_policy: DstPolicy) -> Self {
        Self { tz, dst_policy }
    }

    pub fn localize(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        dst::localize(&self.tz, date.and_time(time), self.dst_policy)
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }
}

/// Expand one availability rule into the windows that intersect `horizon`.
///
/// Each matching local date yields `[date + start_time_of_day, date + end_time_of_day)`.
/// Occurrences are emitted whole, not clipped to the horizon.
///
/// # Errors
/// Returns `EngineError::InvalidRule` if the rule is malformed.
pub fn expand_rule(
    rule: &AvailabilityRule,
    calendar: &LocalCalendar,
    horizon: &Horizon,
) -> Result<Vec<TimeWindow>> {
    rule.validate()?;
    let weekday = rule.weekday()?;

    // Pad by a day on each side so every timezone offset is covered.
    let first = calendar.local_date(horizon.start()) - Duration::days(1);
    let last = calendar.local_date(horizon.end()) + Duration::days(1);

    let mut windows = Vec::new();
    for date in weekday_dates(weekday, first, last)? {
        let (Some(start), Some(end)) = (
            calendar.localize(date, rule.start_time_of_day),
            calendar.localize(date, rule.end_time_of_day),
        ) else {
            continue;
        };
        let Ok(window) = TimeWindow::new(start, end) else {
            continue;
        };
        if window.overlaps(&horizon.window()) {
            windows.push(window);
        }
    }
    Ok(windows)
}

/// Expand one unavailability exception into the windows that intersect `horizon`.
///
/// A one-off exception is returned unchanged if it touches the horizon at all.
/// A weekly exception repeats on the local weekday and time-of-day of its
/// `start_time`, keeps its original duration, and never occurs before it started.
///
/// # Errors
/// Returns `EngineError::InvalidWindow` if `start_time >= end_time`.
pub fn expand_exception(
    exception: &UnavailabilityException,
    calendar: &LocalCalendar,
    horizon: &Horizon,
) -> Result<Vec<TimeWindow>> {
    let original = exception.window()?;

    match exception.recurrence {
        ExceptionRecurrence::Once => Ok(if original.overlaps(&horizon.window()) {
            vec![original]
        } else {
            Vec::new()
        }),
        ExceptionRecurrence::Weekly => {
            let local_start = exception.start_time.with_timezone(&calendar.tz);
            let weekday = local_start.weekday();
            let time_of_day = local_start.time();
            let duration = original.duration();

            // Occurrences that began before the horizon may still reach into it.
            let lead = Duration::days(duration.num_days() + 1);
            let first = (calendar.local_date(horizon.start()) - lead).max(local_start.date_naive());
            let last = calendar.local_date(horizon.end()) + Duration::days(1);
            if first > last {
                return Ok(Vec::new());
            }

            let mut windows = Vec::new();
            for date in weekday_dates(weekday, first, last)? {
                let Some(start) = calendar.localize(date, time_of_day) else {
                    continue;
                };
                if start < exception.start_time {
                    continue;
                }
                let window = TimeWindow::new(start, start + duration)?;
                if window.overlaps(&horizon.window()) {
                    windows.push(window);
                }
            }
            Ok(windows)
        }
    }
}

/// All dates in `[first, last]` falling on `weekday`, via a weekly RRULE.
///
/// # Errors
/// Returns `EngineError::InvalidRule` if the generated RRULE cannot be parsed and
/// `EngineError::InvalidHorizon` if the range yields more occurrences than the cap.
fn weekday_dates(weekday: Weekday, first: NaiveDate, last: NaiveDate) -> Result<Vec<NaiveDate>> {
    // Dates only: anchor everything at UTC midnight so the RRULE never
    // sees a DST transition.
    let rrule_text = format!(
        "DTSTART:{}T000000Z\nRRULE:FREQ=WEEKLY;BYDAY={};UNTIL={}T000000Z",
        first.format("%Y%m%d"),
        byday(weekday),
        last.format("%Y%m%d")
    );

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| EngineError::InvalidRule(format!("{}", e)))?;

    let result = rrule_set.all(MAX_OCCURRENCES);
    if result.limited {
        return Err(EngineError::InvalidHorizon(format!(
            "expansion from {} to {} exceeds {} occurrences",
            first, last, MAX_OCCURRENCES
        )));
    }

    // DTSTART itself is not guaranteed to match BYDAY.
    Ok(result
        .dates
        .into_iter()
        .map(|dt| dt.date_naive())
        .filter(|date| date.weekday() == weekday && *date >= first && *date <= last)
        .collect())
}

fn byday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}
