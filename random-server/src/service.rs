//! Service facade shared by the HTTP and JSON-RPC surfaces.
//!
//! The seed is validated once at construction and injected into a
//! [`DeterministicSelector`]; request handlers only ever see indices.
//!
//! # Example
//! ```
//! use random_core::Seed;
//! use random_server::service::RandomService;
//! use random_telemetry::{TelemetryConfig, TelemetryHandle};
//!
//! let seed = Seed::from_hex(&"9912f3bcf715a55ae5c9d47f9f656259".repeat(2)).unwrap();
//! let telemetry = TelemetryHandle::from_config(TelemetryConfig::default());
//! let service = RandomService::new(seed, telemetry.clone()).unwrap();
//! let index = service.deterministic(7, &[0.3, 0.5, 0.2]).unwrap();
//! assert!(index < 3);
//! assert_eq!(telemetry.flush().counters["random.deterministic"], 1);
//! ```

use std::time::Instant;

use random_core::{
    uniform, DeterministicSelector, Distribution, ErrorKind, Seed, SelectionError, UniformError,
};
use random_telemetry::{TelemetryError, TelemetryHandle};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Uniform(#[from] UniformError),
    #[error("a unique seed value is required")]
    UnsetSeed,
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Selection(err) => err.kind(),
            ServiceError::Uniform(err) => err.kind(),
            ServiceError::UnsetSeed => ErrorKind::Internal,
        }
    }
}

pub struct RandomService {
    selector: DeterministicSelector,
    telemetry: TelemetryHandle,
}

impl RandomService {
    pub fn new(seed: Seed, telemetry: TelemetryHandle) -> Result<Self, ServiceError> {
        if seed.is_unset() {
            return Err(ServiceError::UnsetSeed);
        }
        Ok(Self {
            selector: DeterministicSelector::new(seed),
            telemetry,
        })
    }

    pub fn seed_fingerprint(&self) -> String {
        self.selector.seed().fingerprint()
    }

    pub fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }

    pub fn uniform_int64(&self, min: i32, max: i32) -> Result<i64, ServiceError> {
        let result = uniform::uniform_int64(min, max).map_err(ServiceError::from);
        self.observe("random.uniform_int64", &result);
        result
    }

    pub fn uniform_float64(&self) -> Result<f64, ServiceError> {
        let result = uniform::uniform_float64().map_err(ServiceError::from);
        self.observe("random.uniform_float64", &result);
        result
    }

    /// Select an index for `sequence` under the configured seed.
    pub fn deterministic(
        &self,
        sequence: u64,
        probabilities: &[f64],
    ) -> Result<usize, ServiceError> {
        let started = Instant::now();
        let result = Distribution::try_from(probabilities)
            .and_then(|distribution| self.selector.select(sequence, &distribution))
            .map_err(ServiceError::from);
        self.telemetry.record_latency_us(
            "random.deterministic_us",
            started.elapsed().as_micros().try_into().unwrap_or(u64::MAX),
        );
        self.observe("random.deterministic", &result);
        result
    }

    fn observe<T>(&self, metric: &str, result: &Result<T, ServiceError>) {
        let counter = match result {
            Ok(_) => metric,
            Err(err) => match err.kind() {
                kind @ ErrorKind::InvalidInput => {
                    warn!(
                        operation = metric,
                        kind = kind.as_str(),
                        error = %err,
                        "request rejected"
                    );
                    "random.rejected"
                }
                kind @ ErrorKind::Internal => {
                    error!(
                        operation = metric,
                        kind = kind.as_str(),
                        error = %err,
                        "internal failure"
                    );
                    "random.internal_error"
                }
            },
        };
        // A saturated counter must not fail the request it is counting.
        if let Err(err) = self.count(counter) {
            warn!(metric = counter, error = %err, "telemetry counter dropped");
        }
    }

    fn count(&self, counter: &str) -> Result<(), TelemetryError> {
        self.telemetry.record_counter(counter, 1)
    }
}
