//! Configuration Error Types
//!
//! ## Design Philosophy
//!
//! Configuration errors are the only fatal errors this engine knows: an
//! invalid calibration or an inverted working-hours window means the alarm
//! thresholds are undefined, and running in that state is worse than not
//! starting. Everything that can go wrong *after* startup (sensor faults,
//! storage contention, output faults) is transient by design and lives in
//! the runtime and store crates.
//!
//! Like the rest of this crate the errors are built for constrained
//! targets:
//!
//! 1. **Small and `Copy`**: only inline numeric fields and `&'static str`
//!    reasons, no `String`, so reporting an error never allocates.
//! 2. **Actionable**: each variant carries the offending values so the
//!    operator can fix the configuration without re-running with tracing.

use thiserror_no_std::Error;

/// Result type for configuration validation
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Fatal startup configuration errors
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// Calibration parameters are unusable
    #[error("invalid calibration: {reason}")]
    InvalidCalibration {
        /// What is wrong with the parameters
        reason: &'static str,
    },

    /// Working-hours window is empty or out of range
    #[error("invalid working hours: start {start_hour} end {end_hour} (need 0 <= start < end <= 23)")]
    InvalidWorkingHours {
        /// Configured first active hour
        start_hour: u8,
        /// Configured first inactive hour
        end_hour: u8,
    },

    /// Alarm thresholds are not ordered `0 <= idle < low`
    #[error("invalid alarm thresholds: idle {idle_mpa} MPa, low {low_mpa} MPa")]
    InvalidThresholds {
        /// Configured idle threshold
        idle_mpa: f64,
        /// Configured low-pressure threshold
        low_mpa: f64,
    },

    /// A scheduler interval is zero or otherwise unusable
    #[error("invalid interval: {reason}")]
    InvalidInterval {
        /// Which interval and why it is rejected
        reason: &'static str,
    },
}
