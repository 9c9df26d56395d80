//! Feature and correlation configuration parsing from environment variables.

use crate::application::feature_engineering::DEFAULT_VOLATILITY_WINDOW;
use crate::domain::table::FeatureColumn;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

/// Feature environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureEnvConfig {
    pub volatility_window: usize,
    pub correlation_columns: Vec<FeatureColumn>,
}

impl Default for FeatureEnvConfig {
    fn default() -> Self {
        Self {
            volatility_window: DEFAULT_VOLATILITY_WINDOW,
            correlation_columns: FeatureColumn::default_correlation_set(),
        }
    }
}

impl FeatureEnvConfig {
    pub fn from_env() -> Result<Self> {
        let volatility_window = env::var("VOLATILITY_WINDOW")
            .unwrap_or_else(|_| DEFAULT_VOLATILITY_WINDOW.to_string())
            .parse::<usize>()
            .context("Failed to parse VOLATILITY_WINDOW")?;
        if volatility_window < 2 {
            anyhow::bail!(
                "Invalid VOLATILITY_WINDOW: {}. Must be at least 2",
                volatility_window
            );
        }

        let correlation_columns = match env::var("CORRELATION_COLUMNS") {
            Ok(list) => {
                FeatureColumn::parse_list(&list).context("Failed to parse CORRELATION_COLUMNS")?
            }
            Err(_) => FeatureColumn::default_correlation_set(),
        };
        if correlation_columns.is_empty() {
            anyhow::bail!("CORRELATION_COLUMNS must name at least one column");
        }

        Ok(Self {
            volatility_window,
            correlation_columns,
        })
    }
}
