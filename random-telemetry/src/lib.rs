//! Per-request counters for the random service.
//!
//! The server bumps one counter per answered call (`random.uniform_int64`,
//! `random.uniform_float64`, `random.deterministic`), one per refused call
//! (`random.rejected`, `random.internal_error`) and keeps selection latency
//! in microseconds under `random.deterministic_us`. A background task drains
//! the window into the log every `flush-interval-ms`.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::SystemTime,
};
use thiserror::Error;

#[cfg(any(
    all(feature = "dev", feature = "test"),
    all(feature = "dev", feature = "prod"),
    all(feature = "test", feature = "prod")
))]
compile_error!(
    "Only one of the `dev`, `test`, or `prod` features may be enabled for random-telemetry."
);

#[cfg(feature = "dev")]
const DEFAULT_FLUSH_MS: u64 = 1_000;
#[cfg(feature = "test")]
const DEFAULT_FLUSH_MS: u64 = 500;
#[cfg(not(any(feature = "dev", feature = "test")))]
const DEFAULT_FLUSH_MS: u64 = 30_000;

fn default_flush_interval_ms() -> u64 {
    DEFAULT_FLUSH_MS
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TelemetryConfig {
    /// Collector endpoint; snapshots are logged locally until an exporter exists.
    #[serde(default)]
    pub endpoint: String,
    /// Flush cadence in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Global labels appended to every snapshot.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            flush_interval_ms: default_flush_interval_ms(),
            labels: BTreeMap::new(),
        }
    }
}

impl TelemetryConfig {
    /// Config whose snapshots are tagged with the emitting binary.
    pub fn for_component(component: &str, endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            flush_interval_ms: default_flush_interval_ms(),
            labels: BTreeMap::from([("component".into(), component.to_owned())]),
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("counter overflow for metric {0}")]
    CounterOverflow(String),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TelemetrySnapshot {
    pub timestamp: SystemTime,
    pub labels: BTreeMap<String, String>,
    pub counters: BTreeMap<String, u64>,
    pub latencies_us: BTreeMap<String, Vec<u64>>,
}

impl TelemetrySnapshot {
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty() && self.latencies_us.is_empty()
    }

    pub fn to_json(&self) -> Result<String, TelemetryError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Default)]
struct TelemetryState {
    counters: BTreeMap<String, u64>,
    latencies_us: BTreeMap<String, Vec<u64>>,
}

#[derive(Clone)]
pub struct TelemetryHandle {
    config: TelemetryConfig,
    state: Arc<Mutex<TelemetryState>>,
}

impl TelemetryHandle {
    pub fn from_config(config: TelemetryConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(TelemetryState::default())),
        }
    }

    pub fn record_counter(&self, name: &str, delta: u64) -> Result<(), TelemetryError> {
        let mut guard = self.lock();
        let entry = guard.counters.entry(name.to_owned()).or_default();
        *entry = entry
            .checked_add(delta)
            .ok_or_else(|| TelemetryError::CounterOverflow(name.to_owned()))?;
        Ok(())
    }

    pub fn record_latency_us(&self, name: &str, value: u64) {
        self.lock()
            .latencies_us
            .entry(name.to_owned())
            .or_default()
            .push(value);
    }

    /// Drain everything recorded since the previous flush.
    pub fn flush(&self) -> TelemetrySnapshot {
        let mut guard = self.lock();
        TelemetrySnapshot {
            timestamp: SystemTime::now(),
            labels: self.config.labels.clone(),
            counters: std::mem::take(&mut guard.counters),
            latencies_us: std::mem::take(&mut guard.latencies_us),
        }
    }

    /// Flush and emit the snapshot through `tracing`; empty windows are skipped.
    pub fn flush_to_log(&self) -> Result<(), TelemetryError> {
        let snapshot = self.flush();
        if !snapshot.is_empty() {
            tracing::info!(
                endpoint = %self.config.endpoint,
                snapshot = %snapshot.to_json()?,
                "telemetry flush"
            );
        }
        Ok(())
    }

    pub fn flush_interval(&self) -> u64 {
        self.config.flush_interval_ms
    }

    fn lock(&self) -> MutexGuard<'_, TelemetryState> {
        // Counters stay usable even if a recorder panicked mid-update.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
