//! Working-Hours Gate
//!
//! Sampling and alarming only run during a configured daily window; outside
//! it the plant is unmanned and a low-pressure state is expected, not an
//! alarm condition. The gate is hour-granular on purpose - the reference
//! installation switches the compressors on the hour, and a finer gate
//! would just move spurious alarms to the boundary minutes.
//!
//! The window is half-open: `start_hour <= hour < end_hour`, evaluated
//! against the local wall-clock hour supplied by the runtime clock.

use crate::errors::{ConfigError, ConfigResult};

/// Daily active window, half-open over local hours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkingHours {
    /// First active hour (inclusive), `0..=23`
    pub start_hour: u8,

    /// First inactive hour (exclusive), `0..=23`
    pub end_hour: u8,
}

impl WorkingHours {
    /// Create a validated window
    ///
    /// Rejects empty, inverted, and midnight-wrapping windows: the
    /// invariant is `0 <= start < end <= 23`.
    pub fn new(start_hour: u8, end_hour: u8) -> ConfigResult<Self> {
        let hours = Self {
            start_hour,
            end_hour,
        };
        hours.validate()?;
        Ok(hours)
    }

    /// Check the invariant without constructing
    pub fn validate(&self) -> ConfigResult<()> {
        if self.start_hour >= self.end_hour || self.end_hour > 23 {
            return Err(ConfigError::InvalidWorkingHours {
                start_hour: self.start_hour,
                end_hour: self.end_hour,
            });
        }
        Ok(())
    }

    /// True iff `hour` falls inside the active window
    pub fn is_active(&self, hour: u8) -> bool {
        self.start_hour <= hour && hour < self.end_hour
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: crate::constants::WORKING_HOURS_START,
            end_hour: crate::constants::WORKING_HOURS_END,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_24_boundary_hours() {
        let hours = WorkingHours::new(6, 18).unwrap();

        for hour in 0u8..24 {
            let expected = (6..18).contains(&hour);
            assert_eq!(hours.is_active(hour), expected, "hour {hour}");
        }
    }

    #[test]
    fn half_open_at_both_ends() {
        let hours = WorkingHours::new(8, 17).unwrap();
        assert!(hours.is_active(8));
        assert!(hours.is_active(16));
        assert!(!hours.is_active(17));
        assert!(!hours.is_active(7));
    }

    #[test]
    fn rejects_bad_windows() {
        assert!(WorkingHours::new(18, 6).is_err()); // inverted
        assert!(WorkingHours::new(9, 9).is_err()); // empty
        assert!(WorkingHours::new(6, 24).is_err()); // out of range
    }

    #[test]
    fn default_matches_reference_window() {
        let hours = WorkingHours::default();
        assert!(hours.validate().is_ok());
        assert!(hours.is_active(6));
        assert!(!hours.is_active(18));
    }
}
