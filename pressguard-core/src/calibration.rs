//! Voltage-to-Pressure Conversion with Two-Point Calibration
//!
//! ## Sensing Chain
//!
//! Each channel is an analog pressure sender wired through a resistive
//! voltage divider into the ADC:
//!
//! ```text
//! sender (0..Vmax) ──┬── Rtop ──┬──── ADC input
//!                    │          │
//!                    │         Rbot
//!                    │          │
//!                   GND ───────GND
//! ```
//!
//! The conversion therefore has three steps:
//!
//! 1. **Undo the divider**: `v_sensor = v_adc * (Rtop + Rbot) / Rbot`
//! 2. **Scale to the sender's span**: `raw = v_sensor / Vmax * Pmax`
//! 3. **Linear correction**: `calibrated = raw * slope + offset`
//!
//! ## Why a Two-Point Fit?
//!
//! Cheap analog senders drift in both zero point and span. Two bench
//! observations pin both at once: a known-idle raw reading is mapped to 0,
//! and a known reference raw reading is mapped to its true value:
//!
//! ```text
//! slope  = (true_ref - 0) / (raw_ref - raw_idle)
//! offset = -slope * raw_idle
//! ```
//!
//! The corrected value is clamped at zero - a depressurized circuit reads
//! a hair below the fitted zero and must not report negative pressure.
//!
//! ## Non-Finite Inputs
//!
//! `pressure` is a total function over finite inputs. NaN or infinite
//! voltages propagate through the arithmetic unchanged; the sampling cycle
//! rejects non-finite values as a sensor fault before they reach the alarm
//! machine or the log. Clamping them here would silently turn a broken bus
//! into a plausible 0.0 reading.

use crate::constants;
use crate::errors::{ConfigError, ConfigResult};

/// Per-channel conversion parameters, immutable after startup
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelCalibration {
    /// Span correction from the two-point fit
    pub slope: f64,

    /// Zero-point correction from the two-point fit, in MPa
    pub offset: f64,

    /// `(Rtop + Rbot) / Rbot` of the input divider
    pub divider_ratio: f64,

    /// Full-scale output voltage of the sender
    pub sensor_max_voltage: f64,

    /// Pressure at full-scale output, in MPa
    pub sensor_max_pressure: f64,
}

impl ChannelCalibration {
    /// Create a calibration from explicit parameters
    pub const fn new(
        slope: f64,
        offset: f64,
        divider_ratio: f64,
        sensor_max_voltage: f64,
        sensor_max_pressure: f64,
    ) -> Self {
        Self {
            slope,
            offset,
            divider_ratio,
            sensor_max_voltage,
            sensor_max_pressure,
        }
    }

    /// Fit slope and offset from two calibration reference points
    ///
    /// `raw_idle` is the uncorrected reading observed on a depressurized
    /// circuit (maps to 0); `raw_ref` is the uncorrected reading observed
    /// at a known `true_ref` pressure.
    pub fn from_two_points(
        divider_ratio: f64,
        sensor_max_voltage: f64,
        sensor_max_pressure: f64,
        raw_idle: f64,
        raw_ref: f64,
        true_ref: f64,
    ) -> ConfigResult<Self> {
        if !(raw_ref - raw_idle).is_finite() || raw_ref == raw_idle {
            return Err(ConfigError::InvalidCalibration {
                reason: "calibration reference points coincide",
            });
        }

        let slope = true_ref / (raw_ref - raw_idle);
        let offset = -slope * raw_idle;

        let calibration = Self::new(
            slope,
            offset,
            divider_ratio,
            sensor_max_voltage,
            sensor_max_pressure,
        );
        calibration.validate()?;
        Ok(calibration)
    }

    /// Bench-fitted calibration for the front channel
    pub const fn front_default() -> Self {
        Self::new(
            constants::FRONT_CALIBRATION_SLOPE,
            constants::FRONT_CALIBRATION_OFFSET,
            constants::DIVIDER_RATIO,
            constants::SENSOR_MAX_VOLTAGE,
            constants::SENSOR_MAX_PRESSURE_MPA,
        )
    }

    /// Bench-fitted calibration for the rear channel
    pub const fn rear_default() -> Self {
        Self::new(
            constants::REAR_CALIBRATION_SLOPE,
            constants::REAR_CALIBRATION_OFFSET,
            constants::DIVIDER_RATIO,
            constants::SENSOR_MAX_VOLTAGE,
            constants::SENSOR_MAX_PRESSURE_MPA,
        )
    }

    /// Check the parameters are physically usable
    ///
    /// Called once at startup; a failure here is fatal.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.slope.is_finite() || !self.offset.is_finite() {
            return Err(ConfigError::InvalidCalibration {
                reason: "slope or offset is not finite",
            });
        }
        if self.slope <= 0.0 {
            return Err(ConfigError::InvalidCalibration {
                reason: "slope must be positive",
            });
        }
        if !(self.divider_ratio >= 1.0) {
            return Err(ConfigError::InvalidCalibration {
                reason: "divider ratio must be >= 1",
            });
        }
        if !(self.sensor_max_voltage > 0.0) {
            return Err(ConfigError::InvalidCalibration {
                reason: "sensor max voltage must be positive",
            });
        }
        if !(self.sensor_max_pressure > 0.0) {
            return Err(ConfigError::InvalidCalibration {
                reason: "sensor max pressure must be positive",
            });
        }
        Ok(())
    }

    /// Uncorrected pressure implied by an ADC voltage, in MPa
    pub fn raw_pressure(&self, voltage: f64) -> f64 {
        let v_sensor = voltage * self.divider_ratio;
        v_sensor / self.sensor_max_voltage * self.sensor_max_pressure
    }

    /// Calibrated pressure for an ADC voltage, in MPa, clamped at zero
    pub fn pressure(&self, voltage: f64) -> f64 {
        let calibrated = self.raw_pressure(voltage) * self.slope + self.offset;
        calibrated.max(0.0)
    }
}
