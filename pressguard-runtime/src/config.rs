//! Engine Configuration
//!
//! One struct carries everything the schedulers need, validated once at
//! startup. Validation failures are fatal by design: running with an
//! inverted threshold pair or a zero sampling interval is worse than
//! refusing to start.

use std::time::Duration;

use pressguard_core::{
    constants, AlarmThresholds, ChannelCalibration, ConfigError, ConfigResult, WorkingHours,
};

/// Everything the sampling and retention schedulers are parameterized by
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Front channel conversion parameters
    pub front_calibration: ChannelCalibration,

    /// Rear channel conversion parameters
    pub rear_calibration: ChannelCalibration,

    /// Daily active window for sampling and alarming
    pub working_hours: WorkingHours,

    /// Alarm thresholds and hold window
    pub thresholds: AlarmThresholds,

    /// Cadence of the sampling cycle
    pub sample_interval: Duration,

    /// Budget for a single ADC read before it counts as a fault
    pub read_timeout: Duration,

    /// Age at which log rows are pruned
    pub retention_days: u32,

    /// Local `(hour, minute)` of the daily retention pass
    pub prune_at: (u8, u8),
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            front_calibration: ChannelCalibration::front_default(),
            rear_calibration: ChannelCalibration::rear_default(),
            working_hours: WorkingHours::default(),
            thresholds: AlarmThresholds::default(),
            sample_interval: Duration::from_millis(constants::SAMPLE_INTERVAL_MS),
            read_timeout: Duration::from_millis(constants::READ_TIMEOUT_MS),
            retention_days: constants::RETENTION_DAYS,
            prune_at: (constants::PRUNE_HOUR, constants::PRUNE_MINUTE),
        }
    }
}

impl EngineConfig {
    /// Validate every parameter; call before starting any scheduler
    pub fn validate(&self) -> ConfigResult<()> {
        self.front_calibration.validate()?;
        self.rear_calibration.validate()?;
        self.working_hours.validate()?;
        self.thresholds.validate()?;

        if self.sample_interval.is_zero() {
            return Err(ConfigError::InvalidInterval {
                reason: "sample interval must be non-zero",
            });
        }
        if self.read_timeout.is_zero() || self.read_timeout >= self.sample_interval {
            return Err(ConfigError::InvalidInterval {
                reason: "read timeout must be non-zero and shorter than the sample interval",
            });
        }
        if self.retention_days == 0 {
            return Err(ConfigError::InvalidInterval {
                reason: "retention horizon must be at least one day",
            });
        }
        if self.prune_at.0 > 23 || self.prune_at.1 > 59 {
            return Err(ConfigError::InvalidInterval {
                reason: "prune time must be a valid hour and minute",
            });
        }
        Ok(())
    }
}
