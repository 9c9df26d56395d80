//! Configuration module for trendscope.
//!
//! This module provides structured configuration loading from environment
//! variables or a TOML file, organized by concern: Sources, Features and
//! Forecast.

mod feature_config;
mod forecast_config;
mod loader_config;

pub use feature_config::FeatureEnvConfig;
pub use forecast_config::ForecastEnvConfig;
pub use loader_config::LoaderEnvConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main analysis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sources: LoaderEnvConfig,
    pub features: FeatureEnvConfig,
    pub forecast: ForecastEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let sources = LoaderEnvConfig::from_env();
        let features = FeatureEnvConfig::from_env().context("Failed to load feature config")?;
        let forecast = ForecastEnvConfig::from_env().context("Failed to load forecast config")?;

        Ok(Self {
            sources,
            features,
            forecast,
        })
    }

    /// Load configuration from a TOML file; absent keys keep their defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.features.volatility_window < 2 {
            anyhow::bail!(
                "Invalid volatility_window: {}. Must be at least 2",
                self.features.volatility_window
            );
        }
        if self.features.correlation_columns.is_empty() {
            anyhow::bail!("correlation_columns must name at least one column");
        }
        let c = self.forecast.confidence;
        if !(c > 0.0 && c < 1.0) {
            anyhow::bail!("Invalid confidence: {}. Must be strictly between 0 and 1", c);
        }
        Ok(())
    }
}
