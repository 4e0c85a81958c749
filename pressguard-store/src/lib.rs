//! Durable Telemetry Store for PressGuard
//!
//! ## Overview
//!
//! An append-only, time-ordered log of pressure readings plus a parallel
//! diagnostics log, backed by SQLite, with the windowed-average and
//! retention queries the read API is built from. The store also owns the
//! in-memory latest-reading snapshot: a successful append and the snapshot
//! swap are one code path, so the two views can never diverge.
//!
//! ## Consistency Model
//!
//! - **One writer**: the sampling cycle is the only caller of
//!   [`TelemetryStore::append`]; rows are inserted in cycle order, so the
//!   timestamp column is monotonically non-decreasing by construction.
//! - **Many readers**: queries run concurrently with the writer. The
//!   database runs in WAL journal mode, so readers never block on an
//!   in-flight write and always see a consistent snapshot of the log.
//! - **Bounded waits**: writer-vs-writer contention (an append racing the
//!   daily prune) is bounded by the busy timeout. A timed-out write comes
//!   back as the retryable [`StorageError::Busy`], never a hang of the
//!   sampling cycle.
//!
//! ## Timestamps
//!
//! Rows store local wall-clock time as ISO-8601 text with microseconds
//! (see [`models::TIMESTAMP_FORMAT`]). Text order equals time order, so
//! windowing, date-range, and retention queries are plain string
//! comparisons - and the rows stay byte-compatible with data accumulated
//! by earlier deployments of this system.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod models;

use std::path::Path;
use std::sync::{Mutex, RwLock};

use log::{debug, info};
use rusqlite::Connection;
use thiserror::Error;

use pressguard_core::constants::MS_PER_DAY;
use pressguard_core::reading::Reading;
use pressguard_core::time::Timestamp;

pub use models::{ErrorKind, LoggedErrorEvent, LoggedReading, WindowAverage};

/// How long a writer waits on a locked database before giving up
///
/// Must stay well under the sampling interval budget: an append that
/// cannot get the write lock in this window is abandoned (and retried
/// once by the sampler) instead of stalling the cycle.
const WRITE_WAIT_MS: u64 = 5_000;

/// Result type for store operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Store failures
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database was locked for longer than the busy timeout
    ///
    /// Transient by definition; the caller may retry within its own
    /// budget.
    #[error("database busy: write lock not acquired within {WRITE_WAIT_MS} ms")]
    Busy,

    /// Any other SQLite failure (I/O fault, corrupt file, bad schema)
    #[error("database error: {0}")]
    Database(rusqlite::Error),

    /// A lock guarding the store was poisoned by a panicked thread
    #[error("store lock poisoned")]
    Poisoned,

    /// A date argument was not `YYYY-MM-DD`
    #[error("invalid date: {date:?} (expected YYYY-MM-DD)")]
    InvalidDate {
        /// The rejected argument
        date: String,
    },
}

impl StorageError {
    /// True if retrying the operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Busy)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                StorageError::Busy
            }
            _ => StorageError::Database(err),
        }
    }
}

/// The durable telemetry log plus the latest-reading snapshot
pub struct TelemetryStore {
    conn: Mutex<Connection>,
    snapshot: RwLock<Option<LoggedReading>>,
}

impl TelemetryStore {
    /// Open (creating if needed) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::with_connection(conn)?;
        info!("telemetry store opened at {}", path.as_ref().display());
        Ok(store)
    }

    /// Open a private in-memory store (tests, dry runs)
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StorageResult<Self> {
        conn.busy_timeout(std::time::Duration::from_millis(WRITE_WAIT_MS))?;

        // WAL keeps readers off the writer's lock. In-memory databases
        // report their own journal mode here; either answer is fine.
        let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                front_pressure REAL,
                rear_pressure REAL
            );
            CREATE TABLE IF NOT EXISTS error_logs (
                id INTEGER PRIMARY KEY,
                timestamp TEXT NOT NULL,
                front_pressure REAL,
                rear_pressure REAL,
                error_type TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_readings_timestamp ON readings (timestamp);
            CREATE INDEX IF NOT EXISTS idx_error_logs_timestamp ON error_logs (timestamp);",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            snapshot: RwLock::new(None),
        })
    }

    // -----------------------------------------------------------------
    // Write side (single writer: the sampling cycle)
    // -----------------------------------------------------------------

    /// Append one reading to the log and publish it as the snapshot
    ///
    /// The snapshot is only swapped after the row is durable, and there is
    /// no other snapshot writer, so readers of [`latest`](Self::latest)
    /// and readers of the log can never disagree about the newest reading.
    pub fn append(&self, reading: &Reading) -> StorageResult<()> {
        let timestamp = models::format_timestamp(reading.timestamp);

        {
            let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
            conn.execute(
                "INSERT INTO readings (timestamp, front_pressure, rear_pressure)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![timestamp, reading.front_pressure, reading.rear_pressure],
            )?;
        }

        let logged = LoggedReading {
            timestamp,
            front_pressure: reading.front_pressure,
            rear_pressure: reading.rear_pressure,
        };
        *self.snapshot.write().map_err(|_| StorageError::Poisoned)? = Some(logged);
        Ok(())
    }

    /// Record a diagnostics event
    ///
    /// Runs around the clock, independent of the working-hours gate, and
    /// independent of whether the cycle's reading made it into the log.
    pub fn record_error(
        &self,
        kind: ErrorKind,
        front_pressure: Option<f64>,
        rear_pressure: Option<f64>,
        now: Timestamp,
    ) -> StorageResult<()> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.execute(
            "INSERT INTO error_logs (timestamp, front_pressure, rear_pressure, error_type)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
                models::format_timestamp(now),
                front_pressure,
                rear_pressure,
                kind.as_str()
            ],
        )?;
        Ok(())
    }

    // -----------------------------------------------------------------
    // Read side (any number of concurrent callers)
    // -----------------------------------------------------------------

    /// The most recently committed reading, if any cycle has succeeded
    ///
    /// Served from memory; reports nothing until the first successful
    /// cycle of this process, even if the log holds older rows.
    pub fn latest(&self) -> Option<LoggedReading> {
        self.snapshot.read().ok()?.clone()
    }

    /// All readings with `timestamp >= since`, ascending
    pub fn window(&self, since: Timestamp) -> StorageResult<Vec<LoggedReading>> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT timestamp, front_pressure, rear_pressure FROM readings
             WHERE timestamp >= ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map([models::format_timestamp(since)], |row| {
            Ok(LoggedReading {
                timestamp: row.get(0)?,
                front_pressure: row.get(1)?,
                rear_pressure: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Mean of the non-absent values in the window starting at `since`
    ///
    /// An empty window averages to explicit zeros (not an error); check
    /// [`WindowAverage::samples`] to tell that apart from a genuinely
    /// depressurized window.
    pub fn average(&self, since: Timestamp) -> StorageResult<WindowAverage> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let (front, rear, samples): (Option<f64>, Option<f64>, u64) = conn.query_row(
            "SELECT AVG(front_pressure), AVG(rear_pressure), COUNT(*) FROM readings
             WHERE timestamp >= ?1",
            [models::format_timestamp(since)],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

        Ok(WindowAverage {
            front_avg: front.unwrap_or(0.0),
            rear_avg: rear.unwrap_or(0.0),
            samples,
        })
    }

    /// All readings between two `YYYY-MM-DD` dates, ascending
    ///
    /// Inclusive of the entire end date: the upper bound is the end date
    /// at `23:59:59.999999`.
    pub fn range_by_date(&self, start_date: &str, end_date: &str) -> StorageResult<Vec<LoggedReading>> {
        validate_date(start_date)?;
        validate_date(end_date)?;
        let end_inclusive = format!("{end_date}T23:59:59.999999");

        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT timestamp, front_pressure, rear_pressure FROM readings
             WHERE timestamp BETWEEN ?1 AND ?2 ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map([start_date, end_inclusive.as_str()], |row| {
            Ok(LoggedReading {
                timestamp: row.get(0)?,
                front_pressure: row.get(1)?,
                rear_pressure: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Diagnostics events from the 24 hours before `now`, newest first
    pub fn error_log(&self, now: Timestamp) -> StorageResult<Vec<LoggedErrorEvent>> {
        let cutoff = models::format_timestamp(now.saturating_sub(MS_PER_DAY));

        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let mut stmt = conn.prepare(
            "SELECT timestamp, front_pressure, rear_pressure, error_type FROM error_logs
             WHERE timestamp >= ?1 ORDER BY timestamp DESC",
        )?;
        let rows = stmt.query_map([cutoff], |row| {
            Ok(LoggedErrorEvent {
                timestamp: row.get(0)?,
                front_pressure: row.get(1)?,
                rear_pressure: row.get(2)?,
                error_type: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Number of readings currently in the log
    pub fn reading_count(&self) -> StorageResult<u64> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))
            .map_err(Into::into)
    }

    // -----------------------------------------------------------------
    // Maintenance (the retention scheduler)
    // -----------------------------------------------------------------

    /// Delete all readings and error events older than `older_than`
    ///
    /// Irreversible. Only ever removes rows strictly older than the
    /// cutoff, so it is safe to run concurrently with ongoing appends -
    /// the writer only produces newer rows. Returns the deleted
    /// `(readings, error_events)` counts.
    pub fn prune(&self, older_than: Timestamp) -> StorageResult<(u64, u64)> {
        let cutoff = models::format_timestamp(older_than);

        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let readings = conn.execute("DELETE FROM readings WHERE timestamp < ?1", [&cutoff])?;
        let errors = conn.execute("DELETE FROM error_logs WHERE timestamp < ?1", [&cutoff])?;

        debug!("pruned {readings} readings and {errors} error events older than {cutoff}");
        Ok((readings as u64, errors as u64))
    }
}

fn validate_date(date: &str) -> StorageResult<()> {
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| StorageError::InvalidDate {
            date: date.to_string(),
        })
}
