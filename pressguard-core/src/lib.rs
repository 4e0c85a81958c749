//! Core sampling engine for PressGuard
//!
//! Turns raw ADC voltages from two analog pressure sensors into calibrated
//! pressures, and calibrated pressures into an alarm output decision.
//! Everything in this crate is pure logic: no clocks, no buses, no storage.
//! The runtime crate owns the I/O and feeds this engine once per sampling
//! cycle.
//!
//! Key constraints:
//! - No I/O and no allocation in the per-cycle path
//! - Deterministic: the same inputs always produce the same decision
//! - `no_std` capable for reuse on bare-metal acquisition boards
//!
//! ```
//! use pressguard_core::{AlarmMachine, AlarmThresholds, ChannelCalibration, WorkingHours};
//!
//! let calibration = ChannelCalibration::front_default();
//! let hours = WorkingHours::new(6, 18).unwrap();
//! let mut alarm = AlarmMachine::new(AlarmThresholds::default());
//!
//! let pressure = calibration.pressure(0.50);
//! let decision = alarm.transition(Some(pressure), Some(pressure), hours.is_active(9), 1_000);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod alarm;
pub mod calibration;
pub mod constants;
pub mod errors;
pub mod hours;
pub mod reading;
pub mod time;

// Public API
pub use alarm::{AlarmDecision, AlarmMachine, AlarmState, AlarmStatus, AlarmThresholds};
pub use calibration::ChannelCalibration;
pub use errors::{ConfigError, ConfigResult};
pub use hours::WorkingHours;
pub use reading::Reading;
pub use time::{TimeSource, Timestamp};

/// Crate version, for telemetry payloads and diagnostics
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
