//! Configuration management for the credential fraud detector

use crate::types::detection::RiskLevelThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration file location
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input dataset locations
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// JSON array of `{ "credential": {...}, "label": 0 | 1 }`
    pub training_set: PathBuf,
    /// JSON array of credential objects to score
    pub credentials: PathBuf,
}

/// Model construction settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelConfig {
    /// Seed for weight initialization, dropout and shuffling.
    /// Unset means seeded from OS entropy.
    pub seed: Option<u64>,
}

/// Detection configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectionConfig {
    /// Risk level classification thresholds for alerts
    #[serde(default)]
    pub risk_levels: RiskLevelThresholds,
}

/// Alert output settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// File receiving JSON-lines alerts; stdout when unset
    pub alerts: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path, with `CFD__` environment
    /// variables taking precedence (e.g. `CFD__LOGGING__LEVEL=debug`).
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(Environment::with_prefix("CFD").prefix_separator("__").separator("__"))
            .build()
            .with_context(|| format!("Failed to build configuration from {}", path.as_ref().display()))?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data: DataConfig {
                training_set: PathBuf::from("data/training_set.json"),
                credentials: PathBuf::from("data/credentials.json"),
            },
            model: ModelConfig { seed: Some(42) },
            detection: DetectionConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
