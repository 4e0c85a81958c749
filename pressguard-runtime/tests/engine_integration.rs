//! End-to-End Integration Tests for the PressGuard Engine
//!
//! These tests run the real sampling scheduler against scripted hardware,
//! a hand-advanced clock, and an in-memory telemetry store - the complete
//! acquisition path with nothing mocked below the capability boundary.
//!
//! ## Test Philosophy
//!
//! Cycles are driven explicitly through `run_once` with the clock
//! advanced in lockstep, so hold-window timing is exact rather than
//! sleep-based. The voltages are chosen to land in each of the alarm
//! bands under the bench-fitted default calibration.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use pressguard_runtime::{
    shutdown_pair, AlarmOutput, Clock, EngineApi, EngineConfig, HardwareError, ManualClock,
    SamplingScheduler, SensorChannel, VoltageSource,
};
use pressguard_store::TelemetryStore;

// ===== TEST CONSTANTS =====

/// Sampling cadence the cycles are stamped at.
const CYCLE_MS: u64 = 500;

/// ADC voltage landing below the idle threshold after calibration.
/// 0.16 V -> 0.4 V at the sender -> 0.08 MPa raw -> clamps to 0 MPa.
const IDLE_VOLTS: f64 = 0.16;

/// ADC voltage landing in the warning band.
/// 0.50 V -> 0.25 MPa raw -> ~0.060 MPa calibrated (above idle, below low).
const WARNING_VOLTS: f64 = 0.50;

/// ADC voltage landing in the normal band.
/// 0.80 V -> 0.40 MPa raw -> ~0.249 MPa calibrated.
const NORMAL_VOLTS: f64 = 0.80;

/// A local datetime inside the default working hours (06..18).
fn working_hours_instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// A local datetime outside the default working hours.
fn after_hours_instant() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
}

// ===== SCRIPTED HARDWARE =====

/// One sampling cycle's worth of scripted hardware behavior.
enum Step {
    /// Deliver these `(front, rear)` voltages.
    Sample(f64, f64),
    /// Fail the front read with a bus fault.
    Fault,
}

/// Voltage source that plays back a per-cycle script.
struct ScriptedVoltageSource {
    steps: VecDeque<Step>,
    pending_rear: Option<f64>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedVoltageSource {
    fn new(steps: Vec<Step>) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            Self {
                steps: steps.into(),
                pending_rear: None,
                reads: Arc::clone(&reads),
            },
            reads,
        )
    }
}

#[async_trait]
impl VoltageSource for ScriptedVoltageSource {
    async fn read(&mut self, channel: SensorChannel) -> Result<f64, HardwareError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        match channel {
            SensorChannel::Front => match self.steps.pop_front() {
                Some(Step::Sample(front, rear)) => {
                    self.pending_rear = Some(rear);
                    Ok(front)
                }
                Some(Step::Fault) | None => Err(HardwareError::SensorRead {
                    channel,
                    reason: "scripted bus fault".to_string(),
                }),
            },
            SensorChannel::Rear => self.pending_rear.take().ok_or(HardwareError::SensorRead {
                channel,
                reason: "rear read without a front read".to_string(),
            }),
        }
    }
}

/// Voltage source that always answers with the same level.
struct ConstantVoltageSource(f64);

#[async_trait]
impl VoltageSource for ConstantVoltageSource {
    async fn read(&mut self, _channel: SensorChannel) -> Result<f64, HardwareError> {
        Ok(self.0)
    }
}

/// Alarm output that records every level it is driven to.
#[derive(Clone)]
struct RecordingAlarmOutput {
    levels: Arc<Mutex<Vec<bool>>>,
}

impl RecordingAlarmOutput {
    fn new() -> Self {
        Self {
            levels: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn levels(&self) -> Vec<bool> {
        self.levels.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlarmOutput for RecordingAlarmOutput {
    async fn set(&mut self, level: bool) -> Result<(), HardwareError> {
        self.levels.lock().unwrap().push(level);
        Ok(())
    }
}

// ===== SCENARIOS =====

/// The full alarm lifecycle: a cold circuit pressurizes through the
/// warning band and recovers.
///
/// Expected output trace: low while idle, high on the warning cycle,
/// still high one cycle after recovery (hysteresis hold), low once the
/// hold expires - exactly one hold window, no chatter.
#[tokio::test]
async fn end_to_end_alarm_scenario() {
    let store = Arc::new(TelemetryStore::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(working_hours_instant()));
    let output = RecordingAlarmOutput::new();
    let (source, _reads) = ScriptedVoltageSource::new(vec![
        Step::Sample(IDLE_VOLTS, IDLE_VOLTS),
        Step::Sample(WARNING_VOLTS, WARNING_VOLTS),
        Step::Sample(NORMAL_VOLTS, NORMAL_VOLTS),
        Step::Sample(NORMAL_VOLTS, NORMAL_VOLTS),
    ]);

    let mut scheduler = SamplingScheduler::new(
        EngineConfig::default(),
        source,
        output.clone(),
        clock.clone() as Arc<dyn Clock>,
        Arc::clone(&store),
    )
    .unwrap();

    for _ in 0..4 {
        scheduler.run_once().await;
        clock.advance_ms(CYCLE_MS);
    }

    // Idle -> warning raised -> held through recovery -> released. The
    // output was high from the warning cycle until the cycle after the
    // hold expired: one full hold window.
    assert_eq!(output.levels(), vec![false, true, true, false]);

    // Every successful cycle logged a reading; three distinct pressures
    // (idle clamps to 0, the two normal cycles repeat one value).
    let rows = store.window(0).unwrap();
    assert_eq!(rows.len(), 4);
    let mut distinct: Vec<String> = rows
        .iter()
        .map(|r| format!("{:.6}", r.front_pressure.unwrap()))
        .collect();
    distinct.sort();
    distinct.dedup();
    assert_eq!(distinct.len(), 3);

    // The snapshot is exactly the newest durable row.
    let api = EngineApi::new(Arc::clone(&store), clock.clone() as Arc<dyn Clock>);
    assert_eq!(api.realtime().unwrap(), *rows.last().unwrap());

    // Raising the alarm left one diagnostics event.
    let events = api.error_log().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].error_type, "low_pressure");
}

/// Outside working hours no sensor traffic happens, nothing is logged,
/// and the output is forced low.
#[tokio::test]
async fn gate_closed_skips_sensors_and_log() {
    let store = Arc::new(TelemetryStore::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(after_hours_instant()));
    let output = RecordingAlarmOutput::new();
    let (source, reads) = ScriptedVoltageSource::new(vec![Step::Sample(NORMAL_VOLTS, NORMAL_VOLTS)]);

    let mut scheduler = SamplingScheduler::new(
        EngineConfig::default(),
        source,
        output.clone(),
        clock.clone() as Arc<dyn Clock>,
        Arc::clone(&store),
    )
    .unwrap();

    scheduler.run_once().await;

    assert_eq!(reads.load(Ordering::SeqCst), 0, "ADC must not be touched");
    assert_eq!(store.reading_count().unwrap(), 0);
    assert_eq!(output.levels(), vec![false]);
    assert!(store.latest().is_none());
}

/// A bus fault aborts its cycle without corrupting anything, and the
/// next cycle recovers on its own.
#[tokio::test]
async fn read_failure_aborts_cycle_then_recovers() {
    let store = Arc::new(TelemetryStore::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(working_hours_instant()));
    let output = RecordingAlarmOutput::new();
    let (source, _reads) = ScriptedVoltageSource::new(vec![
        Step::Fault,
        Step::Sample(NORMAL_VOLTS, NORMAL_VOLTS),
    ]);

    let mut scheduler = SamplingScheduler::new(
        EngineConfig::default(),
        source,
        output.clone(),
        clock.clone() as Arc<dyn Clock>,
        Arc::clone(&store),
    )
    .unwrap();

    scheduler.run_once().await;
    clock.advance_ms(CYCLE_MS);

    // Faulted cycle: fail-safe output, no reading, one diagnostics event.
    assert_eq!(store.reading_count().unwrap(), 0);
    assert!(store.latest().is_none());
    assert_eq!(output.levels(), vec![false]);
    let events = store.error_log(clock.timestamp_ms()).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].error_type, "sensor_read_failure");

    scheduler.run_once().await;

    // Recovery without operator intervention.
    assert_eq!(store.reading_count().unwrap(), 1);
    assert!(store.latest().is_some());
}

/// The scheduler stops at a cycle boundary on shutdown and always
/// releases the alarm output on the way out.
#[tokio::test(start_paused = true)]
async fn cooperative_shutdown_releases_output() {
    let store = Arc::new(TelemetryStore::open_in_memory().unwrap());
    let clock = Arc::new(ManualClock::new(working_hours_instant()));
    let output = RecordingAlarmOutput::new();

    let mut config = EngineConfig::default();
    config.sample_interval = Duration::from_millis(50);
    config.read_timeout = Duration::from_millis(10);

    let scheduler = SamplingScheduler::new(
        config,
        ConstantVoltageSource(NORMAL_VOLTS),
        output.clone(),
        clock.clone() as Arc<dyn Clock>,
        Arc::clone(&store),
    )
    .unwrap();

    let (handle, signal) = shutdown_pair();
    let task = scheduler.spawn(signal);

    // Let a few cycles run on virtual time, then pull the plug.
    tokio::time::sleep(Duration::from_millis(160)).await;
    handle.shutdown();
    task.await.unwrap();

    let levels = output.levels();
    assert!(levels.len() > 1, "scheduler should have cycled before shutdown");
    assert_eq!(levels.last(), Some(&false), "output must be released on exit");
    assert!(store.reading_count().unwrap() > 0);
}
