//! DST transition policies for wall-clock rule times.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for local times that fall in a DST gap (e.g. 02:30 during spring forward).
///
/// Ambiguous local times (fall back) always resolve to the earlier instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Skip instances that fall in the DST gap
    Skip,
    /// Move to the first valid instant after the gap
    #[default]
    ShiftForward,
    /// Keep the UTC offset in force before the transition
    WallClock,
}

/// Resolve a local wall-clock time in `tz` to a UTC instant under `policy`.
///
/// Returns `None` only for gap times under [`DstPolicy::Skip`].
pub fn localize(tz: &Tz, local: NaiveDateTime, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => first_instant_after_gap(tz, local),
            DstPolicy::WallClock => {
                // A day earlier is safely before any transition touching `local`.
                let before = tz
                    .offset_from_utc_datetime(&(local - Duration::days(1)))
                    .fix();
                let utc = local - Duration::seconds(i64::from(before.local_minus_utc()));
                Some(utc.and_utc())
            }
        },
    }
}

/// Walk forward minute by minute until the local clock exists again.
fn first_instant_after_gap(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    // Real-world gaps are at most a couple of hours.
    (1..=24 * 60).find_map(|minute| {
        let candidate = local + Duration::minutes(minute);
        tz.from_local_datetime(&candidate)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    })
}
