//! Hardware Boundary Capabilities
//!
//! The engine never touches a bus or a pin directly; it consumes two
//! capabilities and the embedding binary supplies the real drivers (an
//! ADS1115-class ADC behind the voltage divider, a GPIO pin driving the
//! alarm horn). Keeping the boundary this narrow is what lets the
//! integration tests script a whole plant in a few lines.
//!
//! Both traits are async: real drivers sit on a shared I²C bus and the
//! sampling cycle bounds each read with a timeout rather than trusting
//! the bus to answer.

use async_trait::async_trait;
use thiserror::Error;

/// The two analog acquisition channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    /// Front pressure circuit
    Front,
    /// Rear pressure circuit
    Rear,
}

impl SensorChannel {
    /// Stable channel name for logs and diagnostics
    pub const fn name(&self) -> &'static str {
        match self {
            SensorChannel::Front => "front",
            SensorChannel::Rear => "rear",
        }
    }
}

impl std::fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Hardware faults at the boundary
///
/// All transient: a faulted cycle is skipped and the next one retries
/// the hardware from scratch.
#[derive(Debug, Error)]
pub enum HardwareError {
    /// The ADC did not produce a sample
    #[error("sensor read failed on {channel} channel: {reason}")]
    SensorRead {
        /// Which channel faulted
        channel: SensorChannel,
        /// Driver-reported cause
        reason: String,
    },

    /// The ADC did not answer within the cycle's read budget
    #[error("sensor read timed out on {channel} channel")]
    ReadTimeout {
        /// Which channel timed out
        channel: SensorChannel,
    },

    /// Driving the alarm output failed
    #[error("alarm output fault: {reason}")]
    Output {
        /// Driver-reported cause
        reason: String,
    },
}

/// Capability: read the raw ADC voltage of a channel
#[async_trait]
pub trait VoltageSource: Send {
    /// Read one conversion from `channel`, in volts at the ADC input
    async fn read(&mut self, channel: SensorChannel) -> Result<f64, HardwareError>;
}

/// Capability: drive the physical alarm output
#[async_trait]
pub trait AlarmOutput: Send {
    /// Drive the output to `level` (true = alarm asserted)
    ///
    /// Must be idempotent: the sampling cycle re-drives the current level
    /// every tick.
    async fn set(&mut self, level: bool) -> Result<(), HardwareError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names() {
        assert_eq!(SensorChannel::Front.name(), "front");
        assert_eq!(SensorChannel::Rear.to_string(), "rear");
    }

    #[test]
    fn errors_render_the_channel() {
        let err = HardwareError::ReadTimeout {
            channel: SensorChannel::Rear,
        };
        assert!(err.to_string().contains("rear"));
    }
}
