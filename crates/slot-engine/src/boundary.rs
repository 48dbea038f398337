//! Timezone conversion at the system boundary.
//!
//! Callers speak in local wall-clock time; the engine speaks UTC. These helpers
//! are the only place the two meet outside of rule expansion.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::dst::{self, DstPolicy};
use crate::error::{EngineError, Result};
use crate::window::TimeWindow;

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

pub fn parse_timezone(name: &str) -> Result<Tz> {
    name.parse()
        .map_err(|_| EngineError::InvalidTimezone(name.to_string()))
}

/// Parse an ISO 8601 datetime into a UTC instant.
///
/// RFC 3339 input (with an offset or `Z`) keeps its own offset; naive input
/// (e.g. "2026-03-16T11:00") is read as wall-clock time in `tz`. Naive times in
/// a DST gap move to the first valid instant after it. A bare date means local
/// midnight.
pub fn parse_instant(input: &str, tz: &Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| EngineError::InvalidInstant(input.to_string()))?;

    dst::localize(tz, naive, DstPolicy::ShiftForward)
        .ok_or_else(|| EngineError::InvalidInstant(input.to_string()))
}

/// e.g. "Monday, Mar 16 from 11:00 AM to 11:30 AM IST"
pub fn format_window(window: &TimeWindow, tz: &Tz) -> String {
    let start = window.start().with_timezone(tz);
    let end = window.end().with_timezone(tz);
    if start.date_naive() == end.date_naive() {
        format!(
            "{} to {}",
            start.format("%A, %b %d from %I:%M %p"),
            end.format("%I:%M %p %Z")
        )
    } else {
        format!(
            "{} to {}",
            start.format("%A, %b %d from %I:%M %p"),
            end.format("%A, %b %d %I:%M %p %Z")
        )
    }
}
