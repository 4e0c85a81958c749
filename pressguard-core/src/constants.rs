//! Centralized defaults for the PressGuard engine
//!
//! All numeric defaults live here with their units in the name and the
//! rationale in the doc comment. These are starting points taken from the
//! reference hardware (two 1 MPa analog senders behind a resistive divider
//! on a 5 V supply); every one of them is overridable through the runtime
//! configuration.

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1_000;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Milliseconds per day.
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Default sampling cadence.
///
/// 2 Hz is fast enough to catch a pressure drop well inside the alarm hold
/// window while keeping the ADC bus and the telemetry log quiet.
pub const SAMPLE_INTERVAL_MS: u64 = 500;

/// Upper bound on a single ADC conversion.
///
/// A healthy ADS1115-class converter answers in a few milliseconds; a read
/// that takes longer than this indicates a wedged bus and is treated as a
/// sensor fault rather than being allowed to stall the sampling cycle.
pub const READ_TIMEOUT_MS: u64 = 250;

// ---------------------------------------------------------------------------
// Alarm thresholds
// ---------------------------------------------------------------------------

/// Pressure at or below which a circuit counts as not yet pressurized.
///
/// Below this level the machine being monitored is powered down or still
/// filling; the low-pressure alarm must not fire on a cold start.
pub const IDLE_PRESSURE_MPA: f64 = 0.029;

/// Pressure below which (but above idle) the low-pressure alarm raises.
pub const LOW_PRESSURE_MPA: f64 = 0.125;

/// Minimum time the alarm output stays asserted once raised.
///
/// Suppresses output chatter from sensor noise right at the threshold.
pub const ALARM_HOLD_MS: u64 = 1_000;

// ---------------------------------------------------------------------------
// Working hours
// ---------------------------------------------------------------------------

/// Default first active hour (inclusive), local time.
pub const WORKING_HOURS_START: u8 = 6;

/// Default first inactive hour (exclusive), local time.
pub const WORKING_HOURS_END: u8 = 18;

// ---------------------------------------------------------------------------
// Retention
// ---------------------------------------------------------------------------

/// Age at which log rows become eligible for deletion.
pub const RETENTION_DAYS: u32 = 30;

/// Local hour of the daily retention pass.
///
/// Right after the default working window closes, so the prune never
/// competes with a busy append path.
pub const PRUNE_HOUR: u8 = 18;

/// Local minute of the daily retention pass.
pub const PRUNE_MINUTE: u8 = 5;

// ---------------------------------------------------------------------------
// Sensing chain
// ---------------------------------------------------------------------------

/// Upper resistor of the input voltage divider, in ohms.
pub const DIVIDER_TOP_OHMS: f64 = 15_000.0;

/// Lower resistor of the input voltage divider, in ohms.
pub const DIVIDER_BOTTOM_OHMS: f64 = 10_000.0;

/// Divider ratio that reconstructs the sensor voltage from the ADC voltage.
pub const DIVIDER_RATIO: f64 = (DIVIDER_TOP_OHMS + DIVIDER_BOTTOM_OHMS) / DIVIDER_BOTTOM_OHMS;

/// Full-scale output voltage of the pressure senders.
pub const SENSOR_MAX_VOLTAGE: f64 = 5.0;

/// Pressure at full-scale output, in MPa.
pub const SENSOR_MAX_PRESSURE_MPA: f64 = 1.0;

/// Two-point calibration for the front channel.
///
/// Fitted from bench observations: a raw reading of 0.160 MPa on an idle
/// circuit maps to 0, and a raw 0.764 MPa maps to a reference 0.760 MPa.
pub const FRONT_CALIBRATION_SLOPE: f64 = 1.258;

/// Zero-point offset paired with [`FRONT_CALIBRATION_SLOPE`].
pub const FRONT_CALIBRATION_OFFSET: f64 = -0.254;

/// Two-point calibration for the rear channel (raw 0.767 MPa → 0.760 MPa).
pub const REAR_CALIBRATION_SLOPE: f64 = 1.254;

/// Zero-point offset paired with [`REAR_CALIBRATION_SLOPE`].
pub const REAR_CALIBRATION_OFFSET: f64 = -0.254;
