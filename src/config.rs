//! Configuration System
//!
//! Layered configuration: built-in defaults, the global config file, the
//! workspace `config/` directory, then `RESTVIEW__*` environment variables.

use std::path::Path;

use config::{ConfigError, File};
use serde::{Deserialize, Serialize};

use crate::error::AggregationError;
use crate::logging::{is_known_level, LoggingConfig};
use crate::model::CollectionPolicy;
use crate::transport::DeliveryOrder;

mod merge;
mod sources;

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub aggregation: AggregationConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for aggregation episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Whether collection listings suffice or every item must be fetched
    #[serde(default)]
    pub collection_policy: CollectionPolicy,

    /// Answer order used when replaying scripted responses
    #[serde(default)]
    pub delivery_order: DeliveryOrder,

    /// Upper bound on deliveries per replayed episode
    #[serde(default = "default_max_deliveries")]
    pub max_deliveries: usize,
}

fn default_max_deliveries() -> usize {
    10_000
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            collection_policy: CollectionPolicy::default(),
            delivery_order: DeliveryOrder::default(),
            max_deliveries: default_max_deliveries(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Aggregation(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Aggregation(msg) => write!(f, "Aggregation: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AppConfig {
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.aggregation.max_deliveries == 0 {
            errors.push(ValidationError::Aggregation(
                "max_deliveries must be greater than zero".to_string(),
            ));
        }
        if !is_known_level(&self.logging.level) {
            errors.push(ValidationError::Logging(format!(
                "unknown level '{}'",
                self.logging.level
            )));
        }
        if !matches!(self.logging.format.as_str(), "json" | "text") {
            errors.push(ValidationError::Logging(format!(
                "unknown format '{}'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ValidationError::Logging(format!(
                "unknown output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one error.
    pub fn validated(self) -> Result<Self, AggregationError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            AggregationError::Config(format!(
                "Configuration validation failed:\n{}",
                msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace, applying every layer.
    pub fn load(workspace_root: &Path) -> Result<AppConfig, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults()?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, workspace_root)?;
        merge::merge_policy::with_environment(builder)
            .build()?
            .try_deserialize()
    }

    /// Load a single explicit file over the defaults.
    pub fn load_from_file(path: &Path) -> Result<AppConfig, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true));
        merge::merge_policy::with_environment(builder)
            .build()?
            .try_deserialize()
    }

    /// Defaults only, ignoring files and environment.
    pub fn defaults() -> Result<AppConfig, ConfigError> {
        merge::merge_policy::builder_with_defaults()?
            .build()?
            .try_deserialize()
    }
}
