//! Read API for the Web Façade
//!
//! The HTTP layer is a thin external façade; the payload contracts live
//! here. Every method is cheap, side-effect free, and safe to call from
//! any number of concurrent request handlers while the schedulers run.
//!
//! Field names are part of the contract with the deployed dashboards -
//! including the historical `front_averageM` / `rear_averageM` spelling
//! on the minute average - and must not be "cleaned up".

use std::sync::Arc;

use serde::Serialize;

use pressguard_core::constants::{MS_PER_HOUR, MS_PER_MINUTE};
use pressguard_store::{LoggedErrorEvent, LoggedReading, StorageResult, TelemetryStore};

use crate::clock::Clock;

/// Mean pressures over the last hour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyAverage {
    /// Mean front pressure, MPa
    pub front_average: f64,
    /// Mean rear pressure, MPa
    pub rear_average: f64,
}

/// Mean pressures over the last minute
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinuteAverage {
    /// Mean front pressure, MPa
    #[serde(rename = "front_averageM")]
    pub front_average: f64,
    /// Mean rear pressure, MPa
    #[serde(rename = "rear_averageM")]
    pub rear_average: f64,
}

/// Query surface handed to the web façade
///
/// Clones are cheap handles onto the same store and clock.
#[derive(Clone)]
pub struct EngineApi {
    store: Arc<TelemetryStore>,
    clock: Arc<dyn Clock>,
}

impl EngineApi {
    /// Create the API over a store and clock
    pub fn new(store: Arc<TelemetryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The latest committed reading, or `None` until the first
    /// successful cycle ("no data" is an expected early state)
    pub fn realtime(&self) -> Option<LoggedReading> {
        self.store.latest()
    }

    /// Realtime reading as a JSON body, with the explicit no-data signal
    ///
    /// Before the first successful cycle this is the legacy
    /// `{"error": "No data available yet"}` object the dashboards probe
    /// for; afterwards it is the reading itself.
    pub fn realtime_payload(&self) -> serde_json::Value {
        match self.realtime().map(serde_json::to_value) {
            Some(Ok(value)) => value,
            _ => serde_json::json!({ "error": "No data available yet" }),
        }
    }

    /// The last minute of readings, ascending
    pub fn recent_history(&self) -> StorageResult<Vec<LoggedReading>> {
        let since = self.clock.timestamp_ms().saturating_sub(MS_PER_MINUTE);
        self.store.window(since)
    }

    /// Readings for an inclusive `YYYY-MM-DD` date range, ascending
    ///
    /// `start` defaults to today; `end` defaults to `start`, so a single
    /// date argument means "that whole day".
    pub fn history_range(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> StorageResult<Vec<LoggedReading>> {
        let today = self.clock.local_now().format("%Y-%m-%d").to_string();
        let start = start.unwrap_or(&today);
        let end = end.unwrap_or(start);
        self.store.range_by_date(start, end)
    }

    /// Mean pressures over the last hour
    ///
    /// An empty window reports explicit zeros, as the deployed dashboards
    /// expect; use the store's windowed average directly if the sample
    /// count matters.
    pub fn hourly_average(&self) -> StorageResult<HourlyAverage> {
        let since = self.clock.timestamp_ms().saturating_sub(MS_PER_HOUR);
        let avg = self.store.average(since)?;
        Ok(HourlyAverage {
            front_average: avg.front_avg,
            rear_average: avg.rear_avg,
        })
    }

    /// Mean pressures over the last minute
    pub fn minute_average(&self) -> StorageResult<MinuteAverage> {
        let since = self.clock.timestamp_ms().saturating_sub(MS_PER_MINUTE);
        let avg = self.store.average(since)?;
        Ok(MinuteAverage {
            front_average: avg.front_avg,
            rear_average: avg.rear_avg,
        })
    }

    /// Diagnostics events from the last 24 hours, newest first
    pub fn error_log(&self) -> StorageResult<Vec<LoggedErrorEvent>> {
        self.store.error_log(self.clock.timestamp_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{NaiveDate, NaiveDateTime};
    use pressguard_core::Reading;

    fn api_at(datetime: NaiveDateTime) -> (EngineApi, Arc<TelemetryStore>, Arc<ManualClock>) {
        let store = Arc::new(TelemetryStore::open_in_memory().unwrap());
        let clock = Arc::new(ManualClock::new(datetime));
        let api = EngineApi::new(Arc::clone(&store), clock.clone() as Arc<dyn Clock>);
        (api, store, clock)
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn realtime_reports_no_data_before_first_cycle() {
        let (api, store, clock) = api_at(noon());
        assert!(api.realtime().is_none());
        assert_eq!(
            api.realtime_payload(),
            serde_json::json!({ "error": "No data available yet" })
        );

        store
            .append(&Reading::new(clock.timestamp_ms(), Some(0.13), Some(0.13)))
            .unwrap();
        let payload = api.realtime_payload();
        assert!(payload.get("timestamp").is_some());
        assert_eq!(payload["front_pressure"], 0.13);
    }

    #[test]
    fn minute_average_keeps_legacy_field_names() {
        let (api, _store, _clock) = api_at(noon());
        let payload = serde_json::to_value(api.minute_average().unwrap()).unwrap();
        assert!(payload.get("front_averageM").is_some());
        assert!(payload.get("rear_averageM").is_some());
        assert_eq!(payload["front_averageM"], 0.0);
    }

    #[test]
    fn hourly_average_uses_plain_field_names() {
        let (api, _store, _clock) = api_at(noon());
        let payload = serde_json::to_value(api.hourly_average().unwrap()).unwrap();
        assert!(payload.get("front_average").is_some());
        assert!(payload.get("rear_average").is_some());
    }

    #[test]
    fn recent_history_is_the_last_minute() {
        let (api, store, clock) = api_at(noon());
        let now = clock.timestamp_ms();

        store
            .append(&Reading::new(now - 2 * MS_PER_MINUTE, Some(0.1), Some(0.1)))
            .unwrap();
        store
            .append(&Reading::new(now - 30_000, Some(0.2), Some(0.2)))
            .unwrap();

        let rows = api.recent_history().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].front_pressure, Some(0.2));
    }

    #[test]
    fn history_range_defaults_to_today() {
        let (api, store, clock) = api_at(noon());
        let now = clock.timestamp_ms();

        store.append(&Reading::new(now, Some(0.15), Some(0.16))).unwrap();
        // Yesterday's row stays out of the default view.
        store
            .append(&Reading::new(now - 24 * MS_PER_HOUR, Some(0.9), Some(0.9)))
            .unwrap();

        let rows = api.history_range(None, None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].front_pressure, Some(0.15));

        let both_days = api.history_range(Some("2024-02-29"), Some("2024-03-01")).unwrap();
        assert_eq!(both_days.len(), 2);
    }
}
