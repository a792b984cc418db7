//! Configuration System
//!
//! Loads model parameters from a TOML file. Every section and field is
//! optional; missing values fall back to the defaults below.

use serde::{Deserialize, Serialize};
use std::path::Path;

use wealth_events::CollectionTiming;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "model.toml";

/// Top-level configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Population and grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Number of agents
    pub population: u32,
    pub width: u32,
    pub height: u32,
    /// Wrap neighborhoods around the grid edges
    pub torus: bool,
    /// Wealth each agent starts with
    pub initial_wealth: u32,
    /// RNG seed; a fresh entropy seed is used when absent
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            population: 50,
            width: 10,
            height: 10,
            torus: true,
            initial_wealth: 1,
            seed: None,
        }
    }
}

/// Exchange rule options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Let an agent draw itself as its own exchange partner
    pub allow_self_pick: bool,
}

/// Data collection options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub timing: CollectionTiming,
    /// Keep per-agent wealth rows in addition to the model-level index
    pub record_agents: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            timing: CollectionTiming::AfterStep,
            record_agents: true,
        }
    }
}

impl Config {
    /// Configuration for a population on a width x height torus
    pub fn with_size(population: u32, width: u32, height: u32) -> Self {
        let mut config = Self::default();
        config.model.population = population;
        config.model.width = width;
        config.model.height = height;
        config
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let model = &self.model;
        if model.population == 0 {
            return Err(ConfigError::Invalid("population must be positive".to_string()));
        }
        if model.width == 0 || model.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                model.width, model.height
            )));
        }
        let total = u64::from(model.population) * u64::from(model.initial_wealth);
        if total > u64::from(u32::MAX) {
            return Err(ConfigError::Invalid(format!(
                "total wealth {} x {} exceeds what one agent can hold ({})",
                model.population,
                model.initial_wealth,
                u32::MAX
            )));
        }
        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
