//! Hysteresis Alarm State Machine
//!
//! ## Overview
//!
//! Turns a pair of calibrated pressures into one output decision per
//! sampling cycle. The machine is the only owner of alarm state; it
//! performs no I/O - the runtime drives the physical output pin with the
//! level in the returned decision, exactly once per cycle.
//!
//! ## Decision Precedence
//!
//! Evaluated strictly in this order:
//!
//! 1. **Gate closed, or a channel missing** - fail safe: output low. No
//!    hysteresis bookkeeping happens; an unmanned plant or a dead sensor
//!    must never hold an alarm.
//! 2. **Either channel at or below the idle threshold** - the circuit has
//!    not been pressurized yet. Not an alarm condition: the output keeps
//!    whatever level it already had. Idle wins even if the *other* channel
//!    is low, so a cold start next to a running circuit stays quiet.
//! 3. **Either channel below the low threshold** (both above idle) - raise
//!    the alarm and restart the hold window.
//! 4. **Recently raised** - keep the output high until the hold window
//!    expires. This is what suppresses chatter from noise right at the
//!    threshold: recovery mid-hold does not drop the output.
//! 5. **Otherwise** - normal operation, output low.
//!
//! ## Hold Arithmetic
//!
//! The hold uses saturating subtraction on millisecond timestamps, so a
//! wall clock stepping backwards (NTP) extends the hold instead of
//! underflowing it.

use crate::constants;
use crate::errors::{ConfigError, ConfigResult};
use crate::time::Timestamp;

/// Alarm thresholds and hold window, immutable after startup
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmThresholds {
    /// At or below this pressure a circuit counts as not yet pressurized
    pub idle_mpa: f64,

    /// Below this pressure (but above idle) the alarm raises
    pub low_mpa: f64,

    /// Minimum time the output stays high once raised
    pub hold_ms: u64,
}

impl Default for AlarmThresholds {
    fn default() -> Self {
        Self {
            idle_mpa: constants::IDLE_PRESSURE_MPA,
            low_mpa: constants::LOW_PRESSURE_MPA,
            hold_ms: constants::ALARM_HOLD_MS,
        }
    }
}

impl AlarmThresholds {
    /// Check the invariant `0 <= idle < low`, both finite
    pub fn validate(&self) -> ConfigResult<()> {
        let ordered =
            self.idle_mpa.is_finite() && self.low_mpa.is_finite() && 0.0 <= self.idle_mpa;
        if !ordered || self.idle_mpa >= self.low_mpa {
            return Err(ConfigError::InvalidThresholds {
                idle_mpa: self.idle_mpa,
                low_mpa: self.low_mpa,
            });
        }
        Ok(())
    }
}

/// Operating state carried between cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    /// No pressurized circuit seen yet
    Idle,
    /// Both circuits at operating pressure
    Normal,
    /// Low pressure detected, output held high
    Warning,
}

/// Cycle status reported alongside the output level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmStatus {
    /// Gate closed or a channel missing; output forced low
    OutsideHours,
    /// A circuit is not pressurized yet; output untouched
    Idle,
    /// Low pressure, output high (fresh or held)
    Warning,
    /// Operating pressure on both circuits, output low
    Normal,
}

impl AlarmStatus {
    /// Stable string form used in telemetry payloads
    pub const fn as_str(&self) -> &'static str {
        match self {
            AlarmStatus::OutsideHours => "outside_hours",
            AlarmStatus::Idle => "idle",
            AlarmStatus::Warning => "warning",
            AlarmStatus::Normal => "normal",
        }
    }
}

/// What the runtime must do after a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmDecision {
    /// Cycle status for telemetry
    pub status: AlarmStatus,
    /// Level to drive on the physical alarm output
    pub output: bool,
}

/// The alarm state machine
///
/// Exactly one instance exists per engine, owned by the sampling cycle;
/// it is never shared between writers.
#[derive(Debug, Clone)]
pub struct AlarmMachine {
    thresholds: AlarmThresholds,
    state: AlarmState,
    alarm_started_at: Option<Timestamp>,
    output: bool,
}

impl AlarmMachine {
    /// Create a machine in the idle state with the output low
    pub fn new(thresholds: AlarmThresholds) -> Self {
        Self {
            thresholds,
            state: AlarmState::Idle,
            alarm_started_at: None,
            output: false,
        }
    }

    /// Current operating state
    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Level the machine last commanded
    pub fn output(&self) -> bool {
        self.output
    }

    /// Run one cycle of the decision precedence
    pub fn transition(
        &mut self,
        front_pressure: Option<f64>,
        rear_pressure: Option<f64>,
        gate_active: bool,
        now: Timestamp,
    ) -> AlarmDecision {
        let (front, rear) = match (gate_active, front_pressure, rear_pressure) {
            (true, Some(front), Some(rear)) => (front, rear),
            _ => {
                // Fail safe, skip all hysteresis bookkeeping.
                self.output = false;
                return AlarmDecision {
                    status: AlarmStatus::OutsideHours,
                    output: false,
                };
            }
        };

        if front <= self.thresholds.idle_mpa || rear <= self.thresholds.idle_mpa {
            // Quiescent, not recovered: a pending hold survives an idle
            // dip, so no state or output bookkeeping happens here.
            return AlarmDecision {
                status: AlarmStatus::Idle,
                output: self.output,
            };
        }

        // Both channels above idle from here on.
        if front < self.thresholds.low_mpa || rear < self.thresholds.low_mpa {
            self.state = AlarmState::Warning;
            self.alarm_started_at = Some(now);
            self.output = true;
            return AlarmDecision {
                status: AlarmStatus::Warning,
                output: true,
            };
        }

        if self.state == AlarmState::Warning {
            if let Some(started) = self.alarm_started_at {
                if now.saturating_sub(started) < self.thresholds.hold_ms {
                    self.output = true;
                    return AlarmDecision {
                        status: AlarmStatus::Warning,
                        output: true,
                    };
                }
            }
        }

        self.state = AlarmState::Normal;
        self.alarm_started_at = None;
        self.output = false;
        AlarmDecision {
            status: AlarmStatus::Normal,
            output: false,
        }
    }
}
