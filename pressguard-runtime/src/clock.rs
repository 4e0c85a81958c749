//! Wall-Clock Capability
//!
//! The engine needs three views of "now", all derived from one source so
//! they can never disagree within a cycle:
//!
//! - the local calendar datetime (log row timestamps, retention fire time)
//! - the local hour (working-hours gating)
//! - milliseconds on the local timeline (alarm-hold arithmetic)
//!
//! Milliseconds are defined as the local datetime read against the Unix
//! epoch, so the store renders them back to exactly the wall-clock text
//! an operator expects next to the plant clock. The alarm hold only ever
//! subtracts two of them and saturates, so a DST step or NTP jump costs
//! at worst one extended hold, never an underflow.
//!
//! [`ManualClock`] is the test implementation: time moves only when the
//! test says so, which makes hold-window and retention-fire tests exact.

use std::sync::Mutex;

use chrono::{Local, NaiveDateTime, Timelike};

use pressguard_core::time::Timestamp;

/// Source of wall-clock time for the schedulers
///
/// Object safe so long-lived handles can share one `Arc<dyn Clock>`.
pub trait Clock: Send + Sync {
    /// Current local calendar datetime
    fn local_now(&self) -> NaiveDateTime;

    /// Milliseconds of the local timeline
    fn timestamp_ms(&self) -> Timestamp {
        self.local_now().and_utc().timestamp_millis().max(0) as Timestamp
    }

    /// Local hour of day, `0..=23`
    fn local_hour(&self) -> u8 {
        self.local_now().hour() as u8
    }
}

/// The host system clock
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Hand-advanced clock for deterministic tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    /// Create a clock pinned at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move forward by `ms` milliseconds
    pub fn advance_ms(&self, ms: u64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += chrono::Duration::milliseconds(ms as i64);
    }

    /// Jump to an absolute datetime
    pub fn set(&self, to: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn local_now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(at(9, 0));
        let before = clock.timestamp_ms();

        clock.advance_ms(1_500);
        assert_eq!(clock.timestamp_ms() - before, 1_500);
        assert_eq!(clock.local_hour(), 9);

        clock.set(at(18, 30));
        assert_eq!(clock.local_hour(), 18);
    }

    #[test]
    fn system_clock_is_consistent_with_itself() {
        let clock = SystemClock;
        let hour = clock.local_hour();
        assert!(hour <= 23);
        assert!(clock.timestamp_ms() > 0);
    }
}
