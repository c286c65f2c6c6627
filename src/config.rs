//! Configuration management for the claim scoring service

use anyhow::{Context, Result};
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub nats: NatsConfig,
    pub model: ModelConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

/// NATS connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL
    pub url: String,
    /// Request subject for claim scoring
    pub predict_subject: String,
    /// Request subject for vocabulary and model metrics
    pub metadata_subject: String,
    /// Request subject for aggregate claim statistics
    pub stats_subject: String,
}

/// Model artifact and training data locations
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Path of the JSON model artifact
    pub artifact_path: String,
    /// CSV dataset used when the artifact must be trained
    pub dataset_path: String,
    /// Train at startup when the artifact is missing
    #[serde(default = "default_train_if_missing")]
    pub train_if_missing: bool,
}

fn default_train_if_missing() -> bool {
    true
}

/// Pipeline configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Maximum concurrently scored requests
    pub workers: usize,
    /// Seconds between stats summaries in the log
    #[serde(default = "default_report_interval")]
    pub report_interval_secs: u64,
}

fn default_report_interval() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl LoggingConfig {
    /// Install the global tracing subscriber.
    ///
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init(&self) -> Result<()> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&self.level)
                .with_context(|| format!("Invalid log level '{}'", self.level))?,
        };

        let builder = tracing_subscriber::fmt().with_env_filter(filter);
        let installed = match self.format.as_str() {
            "json" => builder.json().try_init(),
            _ => builder.pretty().try_init(),
        };
        installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from `path`, or the defaults when no file exists there.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load_from_path(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig {
                url: "nats://localhost:4222".to_string(),
                predict_subject: "claims.predict".to_string(),
                metadata_subject: "claims.metadata".to_string(),
                stats_subject: "claims.stats".to_string(),
            },
            model: ModelConfig {
                artifact_path: "models/fraud_model.json".to_string(),
                dataset_path: "data/insurance_claims.csv".to_string(),
                train_if_missing: true,
            },
            pipeline: PipelineConfig {
                workers: 4,
                report_interval_secs: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
            },
        }
    }
}
