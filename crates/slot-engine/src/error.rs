//! Error types for slot-engine operations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ExpertId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// A window whose start is not strictly before its end.
    #[error("Invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// An expansion or search range that is empty, unbounded, or too long.
    #[error("Invalid horizon: {0}")]
    InvalidHorizon(String),

    #[error("Expert not found: {0}")]
    ExpertNotFound(ExpertId),

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Opaque failure reported by a [`ScheduleStore`](crate::store::ScheduleStore).
    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
