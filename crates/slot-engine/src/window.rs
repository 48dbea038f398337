//! Half-open UTC time windows and the interval arithmetic the engine is built on.
//!
//! A [`TimeWindow`] is `[start, end)` with `start < end`. Two windows that merely
//! touch (one ends exactly when the other starts) do NOT overlap, but they are
//! coalesced by [`merge_sorted`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// An immutable `[start, end)` interval in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RawWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<RawWindow> for TimeWindow {
    type Error = EngineError;

    fn try_from(raw: RawWindow) -> Result<Self> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Build a window, rejecting `start >= end` with [`EngineError::InvalidWindow`].
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Build a window of `minutes` length starting at `start`.
    ///
    /// A non-positive length, or one whose end is not a representable instant,
    /// is an [`EngineError::InvalidWindow`].
    pub fn starting_at(start: DateTime<Utc>, minutes: i64) -> Result<Self> {
        let end = match Duration::try_minutes(minutes).and_then(|len| start.checked_add_signed(len)) {
            Some(end) => end,
            // Past the last representable instant.
            None if minutes > 0 => {
                return Err(EngineError::InvalidWindow {
                    start,
                    end: DateTime::<Utc>::MAX_UTC,
                })
            }
            None => DateTime::<Utc>::MIN_UTC,
        };
        Self::new(start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    /// `self.start < other.end && other.start < self.end`.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True iff `inner` lies entirely within `self` (shared endpoints allowed).
    pub fn contains(&self, inner: &TimeWindow) -> bool {
        self.start <= inner.start && inner.end <= self.end
    }

    /// True iff `instant` falls in `[start, end)`.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    /// The overlapping portion of two windows, if any.
    pub fn intersection(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeWindow { start, end })
    }

    /// `self` minus the portion covered by `cut`.
    ///
    /// Yields zero windows when `cut` covers `self`, two when `cut` sits strictly
    /// inside `self`, and one otherwise. Empty remainders are never emitted.
    pub fn subtract(&self, cut: &TimeWindow) -> Vec<TimeWindow> {
        if !self.overlaps(cut) {
            return vec![*self];
        }

        let mut pieces = Vec::with_capacity(2);
        if self.start < cut.start {
            pieces.push(TimeWindow {
                start: self.start,
                end: cut.start,
            });
        }
        if cut.end < self.end {
            pieces.push(TimeWindow {
                start: cut.end,
                end: self.end,
            });
        }
        pieces
    }
}

/// Coalesce windows sorted by start into a minimal, ordered, non-overlapping list.
///
/// Adjacent windows (`a.end == b.start`) are joined.
pub fn merge_sorted(windows: &[TimeWindow]) -> Vec<TimeWindow> {
    let mut merged: Vec<TimeWindow> = Vec::with_capacity(windows.len());
    for window in windows {
        if let Some(last) = merged.last_mut() {
            if window.start <= last.end {
                last.end = last.end.max(window.end);
                continue;
            }
        }
        merged.push(*window);
    }
    merged
}

/// Sort then [`merge_sorted`].
pub fn merge(mut windows: Vec<TimeWindow>) -> Vec<TimeWindow> {
    windows.sort();
    merge_sorted(&windows)
}

/// Subtract every window in `cuts` from every window in `bases`.
///
/// Each base is carved iteratively, so several cuts may split one base into
/// several pieces. The result keeps the order of `bases`.
pub fn subtract_all(bases: &[TimeWindow], cuts: &[TimeWindow]) -> Vec<TimeWindow> {
    let mut result = Vec::with_capacity(bases.len());
    for base in bases {
        let mut pieces = vec![*base];
        for cut in cuts.iter().filter(|c| c.overlaps(base)) {
            pieces = pieces.iter().flat_map(|p| p.subtract(cut)).collect();
            if pieces.is_empty() {
                break;
            }
        }
        result.extend(pieces);
    }
    result
}
