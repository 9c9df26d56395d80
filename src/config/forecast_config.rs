//! Forecast configuration parsing from environment variables.

use crate::infrastructure::forecasting::AdditiveModelConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Forecast environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastEnvConfig {
    pub enabled: bool,
    /// Future hourly steps past the last observation.
    pub horizon_hours: usize,
    pub confidence: f64,
    pub min_observations: usize,
}

impl Default for ForecastEnvConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            horizon_hours: 2000,
            confidence: 0.80,
            min_observations: 48,
        }
    }
}

impl ForecastEnvConfig {
    pub fn from_env() -> Result<Self> {
        let enabled = env::var("FORECAST_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .context("Failed to parse FORECAST_ENABLED")?;

        let horizon_hours = env::var("FORECAST_HORIZON_HOURS")
            .unwrap_or_else(|_| "2000".to_string())
            .parse::<usize>()
            .context("Failed to parse FORECAST_HORIZON_HOURS")?;

        let confidence = env::var("FORECAST_CONFIDENCE")
            .unwrap_or_else(|_| "0.80".to_string())
            .parse::<f64>()
            .context("Failed to parse FORECAST_CONFIDENCE")?;
        if !(confidence > 0.0 && confidence < 1.0) {
            anyhow::bail!(
                "Invalid FORECAST_CONFIDENCE: {}. Must be strictly between 0 and 1",
                confidence
            );
        }

        let min_observations = env::var("FORECAST_MIN_OBSERVATIONS")
            .unwrap_or_else(|_| "48".to_string())
            .parse::<usize>()
            .context("Failed to parse FORECAST_MIN_OBSERVATIONS")?;

        Ok(Self {
            enabled,
            horizon_hours,
            confidence,
            min_observations,
        })
    }

    pub fn model_config(&self) -> AdditiveModelConfig {
        AdditiveModelConfig {
            confidence: self.confidence,
            min_observations: self.min_observations,
            ..AdditiveModelConfig::default()
        }
    }
}
