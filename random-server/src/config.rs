use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use random_core::{Seed, SEED_HEX_LEN};
use random_telemetry::TelemetryConfig;
use serde::Deserialize;
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfigFormat {
    Auto,
    Toml,
    Yaml,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {format:?} config: {details}")]
    Parse {
        format: ConfigFormat,
        details: String,
    },
    #[error("configuration invalid: {0}")]
    Validation(String),
}

/// Service configuration.
///
/// # TOML
/// ```text
/// [server]
/// http-listen = "0.0.0.0:3402"
/// max-probabilities-chars = 300
///
/// [selection]
/// seed-hex = "9912...6259"
///
/// [telemetry]
/// endpoint = "http://localhost:4318"
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub selection: SelectionSection,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ServerSection {
    #[serde(default = "default_http_listen")]
    pub http_listen: String,
    /// Upper bound on the raw `p` query parameter of `/getDeterministicRandom`.
    #[serde(default = "default_max_probabilities_chars")]
    pub max_probabilities_chars: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            http_listen: default_http_listen(),
            max_probabilities_chars: default_max_probabilities_chars(),
        }
    }
}

#[derive(Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SelectionSection {
    /// Hex-encoded 32-byte seed shared by every deterministic draw.
    #[serde(default = "default_seed_hex")]
    pub seed_hex: String,
}

impl Default for SelectionSection {
    fn default() -> Self {
        Self {
            seed_hex: default_seed_hex(),
        }
    }
}

impl std::fmt::Debug for SelectionSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionSection")
            .field("seed_hex", &"<redacted>")
            .finish()
    }
}

fn default_http_listen() -> String {
    "0.0.0.0:3402".into()
}

const fn default_max_probabilities_chars() -> usize {
    300
}

fn default_seed_hex() -> String {
    "0".repeat(SEED_HEX_LEN)
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .http_listen
            .parse::<SocketAddr>()
            .map_err(|err| {
                ConfigError::Validation(format!(
                    "http-listen {:?} is not a socket address: {err}",
                    self.server.http_listen
                ))
            })?;
        if self.server.max_probabilities_chars == 0 {
            return Err(ConfigError::Validation(
                "max-probabilities-chars must be greater than zero".into(),
            ));
        }
        self.seed()?;
        Ok(())
    }

    /// Decode the configured seed, refusing the all-zero sentinel.
    pub fn seed(&self) -> Result<Seed, ConfigError> {
        let seed = Seed::from_hex(&self.selection.seed_hex)
            .map_err(|err| ConfigError::Validation(format!("seed-hex: {err}")))?;
        if seed.is_unset() {
            return Err(ConfigError::Validation(
                "a unique seed value is required".into(),
            ));
        }
        Ok(seed)
    }

    pub fn sample() -> Self {
        Self {
            server: ServerSection::default(),
            selection: SelectionSection {
                seed_hex: "9912f3bcf715a55ae5c9d47f9f6562599912f3bcf715a55ae5c9d47f9f656259"
                    .into(),
            },
            telemetry: TelemetryConfig::for_component("random-server", "http://localhost:4318"),
        }
    }
}

/// Read and parse a config file. Validation is left to the caller so command
/// line overrides can be applied first.
pub fn load_config(path: &Path, format: ConfigFormat) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&contents, resolve_format(path, format))
}

pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
    match format {
        ConfigFormat::Toml | ConfigFormat::Auto => {
            toml::from_str(contents).map_err(|err| ConfigError::Parse {
                format: ConfigFormat::Toml,
                details: err.to_string(),
            })
        }
        ConfigFormat::Yaml => serde_yaml::from_str(contents).map_err(|err| ConfigError::Parse {
            format,
            details: err.to_string(),
        }),
    }
}

fn resolve_format(path: &Path, format: ConfigFormat) -> ConfigFormat {
    match format {
        ConfigFormat::Auto => match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Toml,
        },
        _ => format,
    }
}
