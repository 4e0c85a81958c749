//! Row and result models for stored telemetry
//!
//! These are thin, serde-serializable wrappers around SQLite rows: the
//! shapes the read API hands to the web façade. Timestamps are the stored
//! ISO-8601 text, not parsed back into a datetime - the façade forwards
//! them verbatim and the charts parse them client-side.

use serde::{Deserialize, Serialize};

use pressguard_core::time::Timestamp;

/// Timestamp text format used for every stored row
///
/// Local wall-clock time with microseconds. Lexicographic order equals
/// chronological order, so date-prefix and BETWEEN queries work directly
/// on the text column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Render an engine timestamp as stored row text
pub fn format_timestamp(ms: Timestamp) -> String {
    use chrono::DateTime;

    DateTime::from_timestamp_millis(ms as i64)
        .map(|dt| dt.naive_utc().format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| "1970-01-01T00:00:00.000000".to_string())
}

/// A reading as stored in the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedReading {
    /// Stored timestamp text
    pub timestamp: String,

    /// Front channel pressure in MPa, if measured
    pub front_pressure: Option<f64>,

    /// Rear channel pressure in MPa, if measured
    pub rear_pressure: Option<f64>,
}

/// A diagnostics event as stored in the error log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggedErrorEvent {
    /// Stored timestamp text
    pub timestamp: String,

    /// Front channel pressure at the time, if known
    pub front_pressure: Option<f64>,

    /// Rear channel pressure at the time, if known
    pub rear_pressure: Option<f64>,

    /// Stable event kind string, see [`ErrorKind`]
    pub error_type: String,
}

/// Diagnostics event kinds
///
/// Error events are recorded around the clock, independent of the
/// working-hours gate, so an overnight bus fault is still visible the
/// next morning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// An ADC read failed or timed out
    SensorReadFailure,
    /// The log append failed after its retry
    StorageFailure,
    /// Driving the alarm output failed
    OutputFailure,
    /// The alarm raised on low pressure
    LowPressure,
}

impl ErrorKind {
    /// Stable string form stored in the `error_type` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SensorReadFailure => "sensor_read_failure",
            ErrorKind::StorageFailure => "storage_failure",
            ErrorKind::OutputFailure => "output_failure",
            ErrorKind::LowPressure => "low_pressure",
        }
    }
}

/// Windowed average over the readings log
///
/// `samples` is the number of readings in the window. A window with no
/// readings averages to explicit zeros for payload compatibility; callers
/// that need to tell "no data" from a true zero check `samples`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowAverage {
    /// Mean front pressure over the window, MPa
    pub front_avg: f64,

    /// Mean rear pressure over the window, MPa
    pub rear_avg: f64,

    /// Number of readings the means were taken over
    pub samples: u64,
}

impl WindowAverage {
    /// The explicit-zero result for an empty window
    pub const EMPTY: Self = Self {
        front_avg: 0.0,
        rear_avg: 0.0,
        samples: 0,
    };
}
