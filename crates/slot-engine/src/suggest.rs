//! Forward scan for the next bookable slots of a requested duration.
//!
//! The scan resolves availability one chunk at a time starting at the desired
//! instant. Chunks start at `scan_step_days` and double while a chunk yields
//! nothing, and the scan never looks past `max_lookahead_days`. Inside each
//! effective window a candidate slot slides forward in `slot_increment_minutes`
//! steps; a contained, conflict-free candidate is accepted and the next one
//! starts where it ends, so suggestions never overlap each other.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{EngineConfig, MAX_HORIZON_DAYS_LIMIT, MAX_SLOT_INCREMENT_MINUTES};
use crate::error::{EngineError, Result};
use crate::expander::Horizon;
use crate::model::ExpertId;
use crate::schedule::ExpertSchedule;
use crate::window::TimeWindow;

pub const DEFAULT_DURATION_MINUTES: i64 = 30;
pub const DEFAULT_LIMIT: usize = 3;

/// What the caller is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestRequest {
    pub expert_id: ExpertId,
    pub desired_start: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_duration() -> i64 {
    DEFAULT_DURATION_MINUTES
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl SuggestRequest {
    pub fn new(expert_id: ExpertId, desired_start: DateTime<Utc>) -> Self {
        Self {
            expert_id,
            desired_start,
            duration_minutes: DEFAULT_DURATION_MINUTES,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_duration(mut self, minutes: i64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Scan granularity, taken from [`EngineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    pub scan_step_days: i64,
    pub max_lookahead_days: i64,
    pub slot_increment_minutes: i64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl ScanSettings {
    /// # Errors
    /// `EngineError::InvalidConfig` unless every setting is positive and within
    /// [`MAX_HORIZON_DAYS_LIMIT`] days or [`MAX_SLOT_INCREMENT_MINUTES`] minutes.
    pub fn validate(&self) -> Result<()> {
        let days = 1..=MAX_HORIZON_DAYS_LIMIT;
        if days.contains(&self.scan_step_days)
            && days.contains(&self.max_lookahead_days)
            && (1..=MAX_SLOT_INCREMENT_MINUTES).contains(&self.slot_increment_minutes)
        {
            Ok(())
        } else {
            Err(EngineError::InvalidConfig(format!(
                "scan settings out of range: {:?}",
                self
            )))
        }
    }
}

impl From<&EngineConfig> for ScanSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            scan_step_days: config.scan_step_days,
            max_lookahead_days: config.max_lookahead_days,
            slot_increment_minutes: config.slot_increment_minutes,
        }
    }
}

/// Find up to `request.limit` bookable slots at or after `request.desired_start`.
///
/// Slots are returned earliest first. An exhausted lookahead yields whatever was
/// found, possibly nothing.
///
/// # Errors
/// Returns `EngineError::InvalidWindow` if `duration_minutes` is not positive or
/// runs past the last representable instant, `EngineError::InvalidConfig` if the
/// scan settings are out of range, and `EngineError::InvalidHorizon` if the
/// lookahead ends past the last representable instant.
pub fn suggest_slots(
    schedule: &ExpertSchedule,
    request: &SuggestRequest,
    settings: &ScanSettings,
) -> Result<Vec<TimeWindow>> {
    let duration = TimeWindow::starting_at(request.desired_start, request.duration_minutes)?
        .duration();
    settings.validate()?;
    if request.limit == 0 {
        return Ok(Vec::new());
    }

    let increment = Duration::minutes(settings.slot_increment_minutes);
    let mut step = Duration::days(settings.scan_step_days);
    // The last slot may end up to `duration` past the lookahead.
    let lookahead_end = request
        .desired_start
        .checked_add_signed(Duration::days(settings.max_lookahead_days))
        .filter(|end| end.checked_add_signed(duration).is_some())
        .ok_or_else(|| {
            EngineError::InvalidHorizon(format!(
                "lookahead of {} days from {} is out of range",
                settings.max_lookahead_days, request.desired_start
            ))
        })?;
    let mut cursor = request.desired_start;
    let mut found: Vec<TimeWindow> = Vec::with_capacity(request.limit);

    while cursor < lookahead_end && found.len() < request.limit {
        let chunk_end = cursor
            .checked_add_signed(step)
            .map_or(lookahead_end, |end| end.min(lookahead_end));
        // Cover the tail of a slot that starts just before `chunk_end`.
        let horizon = Horizon::unchecked(TimeWindow::new(cursor, chunk_end + duration)?);
        let availability = schedule.resolve(&horizon)?;
        let before = found.len();

        for window in &availability.windows {
            let mut start = if window.start() >= cursor {
                window.start()
            } else {
                align_up(cursor, settings.slot_increment_minutes)?
            };
            if let Some(last) = found.last() {
                start = start.max(last.end());
            }

            while start < chunk_end && found.len() < request.limit {
                let candidate = TimeWindow::new(start, start + duration)?;
                if !window.contains(&candidate) {
                    break;
                }
                if schedule.has_conflict(&candidate) {
                    match start.checked_add_signed(increment) {
                        Some(next) => start = next,
                        None => break,
                    }
                    continue;
                }
                found.push(candidate);
                start = candidate.end();
            }

            if found.len() >= request.limit {
                break;
            }
        }

        tracing::trace!(
            expert_id = request.expert_id,
            %cursor,
            %chunk_end,
            new_slots = found.len() - before,
            "scanned chunk"
        );

        if found.len() == before {
            step = step * 2;
        }
        cursor = chunk_end;
    }

    if found.is_empty() {
        tracing::warn!(
            expert_id = request.expert_id,
            desired_start = %request.desired_start,
            lookahead_days = settings.max_lookahead_days,
            "no bookable slot within lookahead"
        );
    }

    Ok(found)
}

/// Round `instant` up to the next multiple of `minutes` since the Unix epoch.
fn align_up(instant: DateTime<Utc>, minutes: i64) -> Result<DateTime<Utc>> {
    let step = minutes * 60;
    let secs = instant.timestamp();
    let rem = secs.rem_euclid(step);
    let aligned = if rem == 0 && instant.timestamp_subsec_nanos() == 0 {
        secs
    } else {
        secs - rem + step
    };
    DateTime::from_timestamp(aligned, 0)
        .ok_or_else(|| EngineError::InvalidInstant(format!("{} is out of range", instant)))
}
