//! Sampled pressure readings
//!
//! One `Reading` is produced per successful sampling cycle. A channel with
//! no measurement this cycle (outside working hours, aborted read) is
//! `None` - never a sentinel zero, which is a legitimate pressure on a
//! depressurized circuit.

use crate::time::Timestamp;

/// One sampling cycle's calibrated pressures, immutable once created
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// When the cycle ran, in milliseconds
    pub timestamp: Timestamp,

    /// Front channel pressure in MPa, if measured this cycle
    pub front_pressure: Option<f64>,

    /// Rear channel pressure in MPa, if measured this cycle
    pub rear_pressure: Option<f64>,
}

impl Reading {
    /// Create a reading
    pub const fn new(
        timestamp: Timestamp,
        front_pressure: Option<f64>,
        rear_pressure: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            front_pressure,
            rear_pressure,
        }
    }

    /// True iff both channels were measured this cycle
    pub const fn is_complete(&self) -> bool {
        self.front_pressure.is_some() && self.rear_pressure.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completeness() {
        assert!(Reading::new(0, Some(0.1), Some(0.2)).is_complete());
        assert!(!Reading::new(0, Some(0.1), None).is_complete());
        assert!(!Reading::new(0, None, None).is_complete());
    }

    #[test]
    fn zero_is_a_measurement() {
        // 0.0 MPa is real data from a depressurized circuit, distinct
        // from "not measured".
        let reading = Reading::new(0, Some(0.0), None);
        assert_eq!(reading.front_pressure, Some(0.0));
        assert_eq!(reading.rear_pressure, None);
    }
}
