//! Configuration management for the roast recorder
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with ROASTLOG__ prefix

use std::path::PathBuf;
use std::time::Duration;

use config::{ConfigError, Environment, File};
use roastlog_core::{CheckpointPolicy, DEFAULT_YIELD_RATIO};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Live session behaviour
    pub recorder: RecorderConfig,

    /// Where records and the bean list are kept
    pub storage: StorageConfig,

    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RecorderConfig {
    /// How often the running timer is refreshed, in milliseconds
    pub tick_interval_ms: u64,

    /// What a second press on a recorded temperature does
    pub checkpoint_policy: CheckpointPolicy,

    /// Roasted/green ratio used for the automatic roasted weight
    pub default_yield_ratio: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding records.json and beans.json
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when RUST_LOG is not set
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("ROASTLOG__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("recorder.tick_interval_ms", 100)?
            .set_default("recorder.checkpoint_policy", CheckpointPolicy::default().as_str())?
            .set_default("recorder.default_yield_ratio", DEFAULT_YIELD_RATIO.to_string())?
            .set_default("storage.data_dir", "data")?
            .set_default("logging.json", false)?
            .set_default("logging.filter", "roastlog=info,roastlog_recorder=info,roastlog_core=info")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (ROASTLOG__ prefix)
            .add_source(
                Environment::with_prefix("ROASTLOG")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl RecorderConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            checkpoint_policy: CheckpointPolicy::default(),
            default_yield_ratio: DEFAULT_YIELD_RATIO,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}
