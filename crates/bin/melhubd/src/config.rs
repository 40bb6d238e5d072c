//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `melhub.toml` in the working directory, or the file named by
//! `MELHUB_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use melhub_adapter_melcloud::MelcloudConfig;
use serde::Deserialize;

const DEFAULT_PATH: &str = "melhub.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Snapshot polling settings.
    pub polling: PollingConfig,
    /// Integration toggles.
    pub integrations: IntegrationsConfig,
    /// MELCloud integration settings.
    pub melcloud: MelcloudConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// How often device snapshots are re-read.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_secs: u64,
}

/// Per-integration toggles.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct IntegrationsConfig {
    /// Enable the MELCloud integration.
    pub melcloud_enabled: bool,
}

impl Config {
    /// Load configuration from `MELHUB_CONFIG` or `melhub.toml` (if present)
    /// then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var_os("MELHUB_CONFIG")
            .map_or_else(|| PathBuf::from(DEFAULT_PATH), PathBuf::from);
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Some(val) = std::env::var_os("MELHUB_SNAPSHOTS") {
            self.melcloud.snapshot_files = std::env::split_paths(&val).collect();
        }
        if let Ok(val) = std::env::var("MELHUB_POLL_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.polling.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("MELHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.polling.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "polling interval must be non-zero".to_string(),
            ));
        }
        let melcloud = &self.melcloud;
        if melcloud.tank_min_temperature >= melcloud.max_temperature {
            return Err(ConfigError::Validation(format!(
                "tank_min_temperature ({}) must be below max_temperature ({})",
                melcloud.tank_min_temperature, melcloud.max_temperature
            )));
        }
        if melcloud.zone_min_temperature >= melcloud.max_temperature {
            return Err(ConfigError::Validation(format!(
                "zone_min_temperature ({}) must be below max_temperature ({})",
                melcloud.zone_min_temperature, melcloud.max_temperature
            )));
        }
        Ok(())
    }

    /// Return the snapshot polling period.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "melhubd=info,melhub_app=info,melhub_adapter_melcloud=info".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl Default for IntegrationsConfig {
    fn default() -> Self {
        Self {
            melcloud_enabled: true,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
