//! Runtime for the PressGuard Engine
//!
//! ## Overview
//!
//! This crate turns the pure core into a running service:
//!
//! - [`SamplingScheduler`] - the periodic acquisition task: gate, bounded
//!   ADC reads, calibration, alarm transition, output drive, durable
//!   append. The single writer in the system.
//! - [`RetentionScheduler`] - the independent daily prune timer.
//! - [`EngineApi`] - the concurrent read surface handed to the web
//!   façade, with the JSON payload shapes the deployed dashboards expect.
//! - [`hardware`] - the two capabilities the embedding binary implements
//!   against real drivers; [`clock`] - the wall-clock capability.
//!
//! ## Task Topology
//!
//! ```text
//! SamplingScheduler ──► AlarmOutput
//!        │
//!        ▼ append (single writer)
//! TelemetryStore ◄── RetentionScheduler (daily prune)
//!        ▲
//!        │ queries (any number of readers)
//!    EngineApi ◄── web façade
//! ```
//!
//! Both schedulers take a shutdown receiver from [`shutdown_pair`] and
//! stop between cycles; the sampler releases the alarm output on every
//! exit path. Dropping the [`ShutdownHandle`] counts as a shutdown, so
//! the tasks cannot leak past the handle's owner.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod clock;
pub mod config;
pub mod hardware;
pub mod retention;
pub mod sampler;

pub use api::{EngineApi, HourlyAverage, MinuteAverage};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use hardware::{AlarmOutput, HardwareError, SensorChannel, VoltageSource};
pub use retention::RetentionScheduler;
pub use sampler::SamplingScheduler;

use tokio::sync::watch;

/// Sender half of the cooperative shutdown signal
///
/// Triggering (or simply dropping) the handle stops every scheduler
/// holding the paired receiver at its next cycle boundary.
pub struct ShutdownHandle(watch::Sender<bool>);

impl ShutdownHandle {
    /// Signal all listening schedulers to stop
    pub fn shutdown(&self) {
        let _ = self.0.send(true);
    }
}

/// Receiver half of the shutdown signal, cloneable per scheduler
pub type ShutdownSignal = watch::Receiver<bool>;

/// Create a linked shutdown handle/signal pair
pub fn shutdown_pair() -> (ShutdownHandle, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle(tx), rx)
}
