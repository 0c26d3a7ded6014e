//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives for the reefer simulator."
//! ems_version: "v0.1.0"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::logging::LogFormat;

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_tick_interval() -> Duration {
    Duration::from_secs(60)
}

fn default_run_duration() -> Duration {
    Duration::from_secs(240)
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

fn default_file_output() -> bool {
    true
}

/// Structural problems detected while validating an [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("thingsboard host is not set (use THINGSBOARD_HOST, --host or [thingsboard].host)")]
    MissingHost,
    #[error("access token is not set (use ACCESS_TOKEN, --token or [thingsboard].access_token)")]
    MissingToken,
    #[error("access token must not contain '/', '\\', '?', '#' or whitespace")]
    InvalidToken,
    #[error("request timeout must be greater than zero")]
    ZeroRequestTimeout,
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    #[error("run duration must be greater than zero")]
    ZeroRunDuration,
    #[error("telemetry endpoint {url} is not a valid URL: {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Primary configuration object for the simulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub thingsboard: ThingsboardConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    /// `None` when no file was found and built-in defaults are in effect.
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "REEFER_CONFIG";

    /// Load configuration from disk, respecting the `REEFER_CONFIG` override.
    ///
    /// Unlike the daemon configs, a missing file is not an error: the
    /// simulator runs on defaults plus environment credentials. An explicit
    /// `REEFER_CONFIG` path must exist though.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            let path = candidate.as_ref();
            if path.exists() {
                let config = Self::from_path(path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path.to_path_buf()),
                });
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(LoadedAppConfig {
            config: AppConfig::default(),
            source: None,
        })
    }

    /// Parse a TOML file. Validation is deferred until CLI and environment
    /// overrides have been applied.
    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse::<AppConfig>()
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Validate structural invariants. Called once at startup so a bad
    /// configuration fails before the delivery starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thingsboard.validate()?;
        self.simulation.validate()
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        toml::from_str(content).with_context(|| "failed to parse configuration")
    }
}

/// Remote ThingsBoard device endpoint.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThingsboardConfig {
    /// `host[:port]`, without scheme.
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_request_timeout")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub request_timeout: Duration,
}

impl Default for ThingsboardConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            access_token: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ThingsboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.access_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self
            .access_token
            .chars()
            .any(|c| matches!(c, '/' | '\\' | '?' | '#') || c.is_whitespace())
        {
            return Err(ConfigError::InvalidToken);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        self.telemetry_url().map(|_| ())
    }

    /// Device telemetry endpoint: `http://{host}/api/v1/{token}/telemetry`.
    pub fn telemetry_url(&self) -> Result<Url, ConfigError> {
        let raw = format!(
            "http://{}/api/v1/{}/telemetry",
            self.host.trim(),
            self.access_token.trim()
        );
        Url::parse(&raw).map_err(|source| ConfigError::InvalidEndpoint { url: raw, source })
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_tick_interval")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub tick_interval: Duration,
    #[serde(default = "default_run_duration")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub run_duration: Duration,
    /// Fixed seed for reproducible runs; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval: default_tick_interval(),
            run_duration: default_run_duration(),
            seed: None,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.run_duration.is_zero() {
            return Err(ConfigError::ZeroRunDuration);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
    /// Keep a daily rolling JSON log file next to the console output.
    #[serde(default = "default_file_output")]
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
            file_output: default_file_output(),
        }
    }
}
