//! Batch generators behind the `random-simulator` binary.
//!
//! Every generator writes one CSV file named `<Kind>-<unix millis>.csv` into
//! the results directory and returns its path. The first line is a title row
//! describing the run.

use std::{
    fmt::Display,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use random_core::{uniform, DeterministicSelector, Distribution, Seed, SelectionError, UniformError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("unable to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("maximum ({max}) must be greater than minimum ({min})")]
    InvalidRange { min: i32, max: i32 },
    #[error("invalid probability: {0}")]
    InvalidProbability(String),
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Uniform(#[from] UniformError),
}

/// The kinds of batch the simulator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchKind {
    UniformFloat64,
    UniformInt64,
    DeterministicRandom,
}

impl BatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::UniformFloat64 => "UniformFloat64",
            BatchKind::UniformInt64 => "UniformInt64",
            BatchKind::DeterministicRandom => "DeterministicRandom",
        }
    }
}

/// Parse `"0.3, 0.5, 0.2"` into a validated distribution.
pub fn parse_distribution(raw: &str) -> Result<Distribution, SimulatorError> {
    let probabilities =
        Distribution::parse_list(raw).map_err(SimulatorError::InvalidProbability)?;
    Ok(Distribution::new(probabilities)?)
}

pub fn generate_uniform_float64(dir: &Path, count: u64) -> Result<PathBuf, SimulatorError> {
    let mut out = ResultsFile::create(dir, BatchKind::UniformFloat64)?;
    out.line("UniformFloat64 (0-1]")?;
    for _ in 0..count {
        out.line(uniform::uniform_float64()?)?;
    }
    out.finish(count)
}

/// Rejects `max <= min` before any file is created.
pub fn generate_uniform_int64(
    dir: &Path,
    count: u64,
    min: i32,
    max: i32,
) -> Result<PathBuf, SimulatorError> {
    if max <= min {
        return Err(SimulatorError::InvalidRange { min, max });
    }
    let mut out = ResultsFile::create(dir, BatchKind::UniformInt64)?;
    out.line(format!("UniformInt64 ({min}-{max})"))?;
    for _ in 0..count {
        out.line(uniform::uniform_int64(min, max)?)?;
    }
    out.finish(count)
}

/// Replays sequences `0..count` against one seed and distribution.
///
/// The title row carries the seed fingerprint, never the seed itself.
pub fn generate_deterministic(
    dir: &Path,
    count: u64,
    seed: &Seed,
    distribution: &Distribution,
) -> Result<PathBuf, SimulatorError> {
    let selector = DeterministicSelector::new(*seed);
    let table = distribution.thresholds();

    let mut out = ResultsFile::create(dir, BatchKind::DeterministicRandom)?;
    out.line(format!(
        "DeterministicRandom ({} {})",
        seed.fingerprint(),
        format_probabilities(distribution.probabilities())
    ))?;
    out.line("SequenceNr, SelectedIndex")?;
    for sequence in 0..count {
        let index = selector.select_with_table(sequence, &table)?;
        out.line(format!("{sequence}, {index}"))?;
    }
    out.finish(count)
}

fn format_probabilities(probabilities: &[f64]) -> String {
    let joined = probabilities
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{joined}]")
}

struct ResultsFile {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl ResultsFile {
    fn create(dir: &Path, kind: BatchKind) -> Result<Self, SimulatorError> {
        fs::create_dir_all(dir).map_err(|source| SimulatorError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let path = dir.join(format!("{}-{millis}.csv", kind.as_str()));
        let file = File::create(&path).map_err(|source| SimulatorError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    fn line(&mut self, value: impl Display) -> Result<(), SimulatorError> {
        writeln!(self.writer, "{value}").map_err(|source| SimulatorError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn finish(mut self, rows: u64) -> Result<PathBuf, SimulatorError> {
        self.writer.flush().map_err(|source| SimulatorError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), rows, "results written");
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_render_space_separated() {
        assert_eq!(format_probabilities(&[0.3, 0.5, 0.2]), "[0.3 0.5 0.2]");
        assert_eq!(format_probabilities(&[1.0]), "[1]");
    }

    #[test]
    fn parse_distribution_reports_bad_token() {
        let err = parse_distribution("0.5, half").unwrap_err();
        assert_eq!(err.to_string(), "invalid probability: half");
        assert!(matches!(
            parse_distribution("0.5, 0.4"),
            Err(SimulatorError::Selection(
                SelectionError::DistributionNotNormalized { .. }
            ))
        ));
    }

    #[test]
    fn batch_kinds_name_their_files() {
        assert_eq!(BatchKind::UniformInt64.as_str(), "UniformInt64");
        assert_eq!(BatchKind::DeterministicRandom.as_str(), "DeterministicRandom");
    }
}
