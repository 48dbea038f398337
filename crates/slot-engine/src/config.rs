//! Engine configuration: horizons, scan granularity, and the default timezone.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::DstPolicy;
use crate::error::{EngineError, Result};

/// Upper bound on `max_horizon_days` (ten years).
pub const MAX_HORIZON_DAYS_LIMIT: i64 = 3650;

/// Upper bound on `slot_increment_minutes` (one day).
pub const MAX_SLOT_INCREMENT_MINUTES: i64 = 24 * 60;

/// Tunables for expansion and slot search.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Timezone used for experts that have none recorded.
    pub default_timezone: String,
    /// Horizon used when a caller asks for availability without an end.
    pub default_horizon_days: i64,
    /// Longest range any single expansion may cover.
    pub max_horizon_days: i64,
    /// Initial resolve window of the slot scan; doubles while nothing is found.
    pub scan_step_days: i64,
    /// How far past the desired start the slot scan may look.
    pub max_lookahead_days: i64,
    /// Spacing of candidate slot starts.
    pub slot_increment_minutes: i64,
    pub default_duration_minutes: i64,
    pub default_suggestion_limit: usize,
    pub dst_policy: DstPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_timezone: "Asia/Kolkata".to_string(),
            default_horizon_days: 30,
            max_horizon_days: 90,
            scan_step_days: 1,
            max_lookahead_days: 14,
            slot_increment_minutes: 15,
            default_duration_minutes: 30,
            default_suggestion_limit: 3,
            dst_policy: DstPolicy::ShiftForward,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_json::from_str(json).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.timezone()?;
        if self.max_horizon_days <= 0 || self.max_horizon_days > MAX_HORIZON_DAYS_LIMIT {
            return Err(EngineError::InvalidHorizon(format!(
                "max_horizon_days must be in 1..={}",
                MAX_HORIZON_DAYS_LIMIT
            )));
        }
        if self.default_horizon_days <= 0 || self.default_horizon_days > self.max_horizon_days {
            return Err(EngineError::InvalidHorizon(format!(
                "default_horizon_days must be in 1..={}",
                self.max_horizon_days
            )));
        }
        if self.max_lookahead_days <= 0 || self.max_lookahead_days > self.max_horizon_days {
            return Err(EngineError::InvalidHorizon(format!(
                "max_lookahead_days must be in 1..={}",
                self.max_horizon_days
            )));
        }
        if self.scan_step_days <= 0 || self.scan_step_days > self.max_lookahead_days {
            return Err(EngineError::InvalidConfig(format!(
                "scan_step_days must be in 1..={}",
                self.max_lookahead_days
            )));
        }
        if self.slot_increment_minutes <= 0
            || self.slot_increment_minutes > MAX_SLOT_INCREMENT_MINUTES
        {
            return Err(EngineError::InvalidConfig(format!(
                "slot_increment_minutes must be in 1..={}",
                MAX_SLOT_INCREMENT_MINUTES
            )));
        }
        // A default slot must fit inside one horizon.
        let max_duration = self.max_horizon_days * 24 * 60;
        if self.default_duration_minutes <= 0 || self.default_duration_minutes > max_duration {
            return Err(EngineError::InvalidConfig(format!(
                "default_duration_minutes must be in 1..={}",
                max_duration
            )));
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.default_timezone
            .parse()
            .map_err(|_| EngineError::InvalidTimezone(self.default_timezone.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Kolkata);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json(r#"{"max_lookahead_days": 7}"#).unwrap();
        assert_eq!(config.max_lookahead_days, 7);
        assert_eq!(config.slot_increment_minutes, 15);
        assert_eq!(config.dst_policy, DstPolicy::ShiftForward);
    }

    #[test]
    fn lookahead_beyond_max_horizon_is_rejected() {
        let result = EngineConfig::from_json(r#"{"max_lookahead_days": 120}"#);
        assert!(matches!(result, Err(EngineError::InvalidHorizon(_))));
    }

    #[test]
    fn oversized_max_horizon_is_rejected() {
        let result = EngineConfig::from_json(r#"{"max_horizon_days": 9000000000000000000}"#);
        assert!(matches!(result, Err(EngineError::InvalidHorizon(_))));

        let result = EngineConfig::from_json(r#"{"max_horizon_days": 3651}"#);
        assert!(matches!(result, Err(EngineError::InvalidHorizon(_))));

        let config = EngineConfig::from_json(r#"{"max_horizon_days": 3650}"#).unwrap();
        assert_eq!(config.max_horizon_days, MAX_HORIZON_DAYS_LIMIT);
    }

    #[test]
    fn oversized_slot_increment_is_rejected() {
        let result = EngineConfig::from_json(r#"{"slot_increment_minutes": 9000000000000000000}"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));

        let result = EngineConfig::from_json(r#"{"slot_increment_minutes": 1441}"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));

        assert!(EngineConfig::from_json(r#"{"slot_increment_minutes": 1440}"#).is_ok());
    }

    #[test]
    fn scan_step_and_duration_are_bounded() {
        let result = EngineConfig::from_json(r#"{"scan_step_days": 15}"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));

        let result = EngineConfig::from_json(r#"{"default_duration_minutes": 9223372036854775807}"#);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        let result = EngineConfig::from_json(r#"{"default_timezone": "Mars/Olympus"}"#);
        assert!(matches!(result, Err(EngineError::InvalidTimezone(_))));
    }
}
