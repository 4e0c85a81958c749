//! The Sampling Scheduler
//!
//! ## Overview
//!
//! One background task drives the whole acquisition path: gate check,
//! bounded ADC reads, calibration, the alarm transition, the output
//! drive, and the durable append. It is the only writer of readings and
//! of the latest snapshot, which is what keeps the log monotonic without
//! any cross-task locking.
//!
//! ## Failure Containment
//!
//! Nothing a cycle encounters may take the loop down:
//!
//! - a read fault or timeout aborts the cycle - snapshot and log stay
//!   untouched, the alarm output fails safe to low, a diagnostics event
//!   is recorded, and the next tick starts clean;
//! - an output fault is logged and recorded, never propagated;
//! - a busy append is retried once inside the cycle budget, then the
//!   cycle is abandoned. Persistent storage failure degrades the engine
//!   to "serving the last snapshot, no new history" - it does not crash.
//!
//! ## Cadence
//!
//! The tick interval self-corrects for processing time; when a cycle
//! overruns, the scheduler delays to the next full interval instead of
//! bursting to catch up. Best-effort periodic, not hard real-time.
//!
//! ## Shutdown
//!
//! Cooperative, checked between cycles. Every exit path releases the
//! alarm output to its safe (low) state before the task returns.

use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use pressguard_core::{AlarmDecision, AlarmMachine, AlarmStatus, Reading};
use pressguard_store::{ErrorKind, TelemetryStore};

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::hardware::{AlarmOutput, HardwareError, SensorChannel, VoltageSource};

/// The periodic sampling task
///
/// Owns the alarm machine, both hardware capabilities, and the single
/// write handle to the telemetry store.
pub struct SamplingScheduler<V, O> {
    config: EngineConfig,
    alarm: AlarmMachine,
    last_status: Option<AlarmStatus>,
    source: V,
    output: O,
    clock: Arc<dyn Clock>,
    store: Arc<TelemetryStore>,
}

impl<V, O> SamplingScheduler<V, O>
where
    V: VoltageSource,
    O: AlarmOutput,
{
    /// Create a scheduler after validating the configuration
    pub fn new(
        config: EngineConfig,
        source: V,
        output: O,
        clock: Arc<dyn Clock>,
        store: Arc<TelemetryStore>,
    ) -> pressguard_core::ConfigResult<Self> {
        config.validate()?;
        let alarm = AlarmMachine::new(config.thresholds);
        Ok(Self {
            config,
            alarm,
            last_status: None,
            source,
            output,
            clock,
            store,
        })
    }

    /// Run until the shutdown signal fires
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "sampling scheduler started ({} ms cadence)",
            self.config.sample_interval.as_millis()
        );

        let mut ticker = tokio::time::interval(self.config.sample_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.run_once().await,
                _ = shutdown.changed() => break,
            }
        }

        // Scoped release: the horn must be quiet after every exit path.
        match self.output.set(false).await {
            Ok(()) => info!("sampling scheduler stopped, alarm output released"),
            Err(err) => warn!("failed to release alarm output on shutdown: {err}"),
        }
    }

    /// Spawn [`run`](Self::run) on the current tokio runtime
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
    where
        V: 'static,
        O: 'static,
    {
        tokio::spawn(self.run(shutdown))
    }

    /// Execute exactly one sampling cycle
    ///
    /// Public so embedders (and tests) can drive the engine from their
    /// own scheduler instead of [`run`](Self::run).
    pub async fn run_once(&mut self) {
        let now = self.clock.timestamp_ms();
        let gate_active = self.config.working_hours.is_active(self.clock.local_hour());

        if !gate_active {
            // Quiescent period, not a failure: no sensor traffic, no log
            // growth, output forced low by the machine.
            let decision = self.alarm.transition(None, None, false, now);
            self.drive_output(decision).await;
            self.last_status = Some(decision.status);
            return;
        }

        let front_volts = match self.read_channel(SensorChannel::Front).await {
            Ok(v) => v,
            Err(err) => return self.abort_cycle(err, now).await,
        };
        let rear_volts = match self.read_channel(SensorChannel::Rear).await {
            Ok(v) => v,
            Err(err) => return self.abort_cycle(err, now).await,
        };

        let front_pressure = self.config.front_calibration.pressure(front_volts);
        let rear_pressure = self.config.rear_calibration.pressure(rear_volts);

        let decision = self
            .alarm
            .transition(Some(front_pressure), Some(rear_pressure), true, now);
        self.drive_output(decision).await;

        if decision.status == AlarmStatus::Warning && self.last_status != Some(AlarmStatus::Warning)
        {
            warn!(
                "low pressure alarm raised: front {front_pressure:.3} MPa, rear {rear_pressure:.3} MPa"
            );
            self.record_event(
                ErrorKind::LowPressure,
                Some(front_pressure),
                Some(rear_pressure),
                now,
            );
        }
        self.last_status = Some(decision.status);

        let reading = Reading::new(now, Some(front_pressure), Some(rear_pressure));
        self.append_with_retry(&reading, now);
        debug!(
            "cycle complete: front {front_pressure:.3} MPa, rear {rear_pressure:.3} MPa, status {}",
            decision.status.as_str()
        );
    }

    /// Read one channel within the cycle's read budget
    async fn read_channel(&mut self, channel: SensorChannel) -> Result<f64, HardwareError> {
        let volts = tokio::time::timeout(self.config.read_timeout, self.source.read(channel))
            .await
            .map_err(|_| HardwareError::ReadTimeout { channel })??;

        // Calibration propagates NaN/inf untouched; reject it here so a
        // broken bus can never masquerade as a pressure.
        if !volts.is_finite() {
            return Err(HardwareError::SensorRead {
                channel,
                reason: "non-finite sample".to_string(),
            });
        }
        Ok(volts)
    }

    /// Abandon the cycle after a read fault: fail safe, record, skip
    ///
    /// Neither the snapshot nor the log is touched by an aborted cycle.
    async fn abort_cycle(&mut self, err: HardwareError, now: u64) {
        warn!("sampling cycle aborted: {err}");

        let decision = self.alarm.transition(None, None, true, now);
        self.drive_output(decision).await;
        self.last_status = Some(decision.status);

        self.record_event(ErrorKind::SensorReadFailure, None, None, now);
    }

    /// Drive the physical output; faults are logged, never fatal
    async fn drive_output(&mut self, decision: AlarmDecision) {
        if let Err(err) = self.output.set(decision.output).await {
            warn!("alarm output fault: {err}");
            self.record_event(ErrorKind::OutputFailure, None, None, self.clock.timestamp_ms());
        }
    }

    /// Append within the cycle budget: one retry on contention, then drop
    fn append_with_retry(&mut self, reading: &Reading, now: u64) {
        let retry = match self.store.append(reading) {
            Ok(()) => return,
            Err(err) if err.is_retryable() => {
                debug!("append contended, retrying once: {err}");
                self.store.append(reading)
            }
            Err(err) => Err(err),
        };

        if let Err(err) = retry {
            error!("reading dropped, storage unavailable: {err}");
            self.record_event(
                ErrorKind::StorageFailure,
                reading.front_pressure,
                reading.rear_pressure,
                now,
            );
        }
    }

    /// Best-effort diagnostics write; never disturbs the cycle
    fn record_event(
        &self,
        kind: ErrorKind,
        front_pressure: Option<f64>,
        rear_pressure: Option<f64>,
        now: u64,
    ) {
        if let Err(err) = self.store.record_error(kind, front_pressure, rear_pressure, now) {
            debug!("diagnostics event dropped: {err}");
        }
    }
}
