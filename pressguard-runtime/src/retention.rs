//! The Retention Scheduler
//!
//! A recurring daily timer, independent of the sampling cadence, with its
//! own cancellation handle. Each iteration computes the next local
//! wall-clock fire instant from the clock - there is no drifting "sleep
//! 24 h" loop, and a clock adjusted while the task sleeps only shifts one
//! firing.
//!
//! Pruning only ever deletes rows strictly older than the retention
//! horizon, so it can run concurrently with appends: the writer only
//! produces rows newer than any cutoff this task will ever compute.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use log::{error, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use pressguard_core::constants::MS_PER_DAY;
use pressguard_store::TelemetryStore;

use crate::clock::Clock;

/// The daily prune task
pub struct RetentionScheduler {
    store: Arc<TelemetryStore>,
    clock: Arc<dyn Clock>,
    retention_days: u32,
    fire_at: (u8, u8),
}

impl RetentionScheduler {
    /// Create a scheduler pruning rows older than `retention_days` at
    /// local `fire_at = (hour, minute)` every day
    pub fn new(
        store: Arc<TelemetryStore>,
        clock: Arc<dyn Clock>,
        retention_days: u32,
        fire_at: (u8, u8),
    ) -> Self {
        Self {
            store,
            clock,
            retention_days,
            fire_at,
        }
    }

    /// Run until the shutdown signal fires
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "retention scheduler started (daily at {:02}:{:02}, {} day horizon)",
            self.fire_at.0, self.fire_at.1, self.retention_days
        );

        loop {
            let delay = next_fire_delay(self.clock.local_now(), self.fire_at);
            tokio::select! {
                _ = tokio::time::sleep(delay) => self.prune_once(),
                _ = shutdown.changed() => break,
            }
        }
        info!("retention scheduler stopped");
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// One retention pass
    pub fn prune_once(&self) {
        let horizon_ms = u64::from(self.retention_days) * MS_PER_DAY;
        let cutoff = self.clock.timestamp_ms().saturating_sub(horizon_ms);

        match self.store.prune(cutoff) {
            Ok((readings, errors)) => {
                info!("retention pass removed {readings} readings, {errors} error events")
            }
            // A contended or failed prune is retried tomorrow; the log
            // just carries a day of extra rows until then.
            Err(err) => error!("retention pass failed: {err}"),
        }
    }
}

/// Time until the next daily `(hour, minute)` after `now`
///
/// If today's fire time has already passed (or is this instant), the next
/// firing is tomorrow.
pub fn next_fire_delay(now: NaiveDateTime, fire_at: (u8, u8)) -> Duration {
    let today_target = now
        .date()
        .and_hms_opt(u32::from(fire_at.0), u32::from(fire_at.1), 0)
        .unwrap_or(now);

    let target = if today_target > now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };

    (target - now)
        .to_std()
        .unwrap_or(Duration::from_secs(24 * 60 * 60))
}
