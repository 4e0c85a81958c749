//! Time handling for the sampling engine
//!
//! The engine only ever does interval arithmetic on time: "how long has the
//! alarm been held", "is this reading inside the window". A plain
//! millisecond counter is enough for that, so timestamps are `u64`
//! milliseconds and the trait below abstracts where they come from:
//!
//! - The runtime supplies wall-clock milliseconds on the host
//! - Tests supply a hand-advanced counter for deterministic hold timing
//!
//! Wall-clock formatting (log rows, working-hours gating) is deliberately
//! not part of this crate; the runtime owns the calendar.

/// Timestamp in milliseconds
///
/// The epoch depends on the source: Unix epoch for wall-clock sources,
/// boot time for monotonic counters, arbitrary for test sources. The
/// engine only subtracts timestamps from the same source, so the epoch
/// never matters.
pub type Timestamp = u64;

/// Source of timestamps for the engine
pub trait TimeSource: Send {
    /// Get the current timestamp in milliseconds
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs monotonic)
    ///
    /// Wall clock time can jump (NTP, manual setting); monotonic time only
    /// moves forward. The alarm hold tolerates either because it uses
    /// saturating subtraction.
    fn is_wall_clock(&self) -> bool;
}

/// Fixed time source for testing
///
/// Starts wherever the test puts it and only moves when told to, which
/// makes hysteresis-hold tests exact instead of sleep-based.
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Create a source pinned at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Advance by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp += ms;
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}

/// System wall-clock source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}
