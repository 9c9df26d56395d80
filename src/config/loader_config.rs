//! Source file configuration parsing from environment variables.
//!
//! This module handles the two CSV inputs and how their columns are read.

use crate::application::ingest::SeriesSpec;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Input source environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderEnvConfig {
    pub search_csv_path: PathBuf,
    pub stock_csv_path: PathBuf,
    pub search: SeriesSpec,
    pub stock: SeriesSpec,
}

impl Default for LoaderEnvConfig {
    fn default() -> Self {
        Self {
            search_csv_path: PathBuf::from("data/google_hourly_search_trends.csv"),
            stock_csv_path: PathBuf::from("data/mercado_stock_price.csv"),
            search: SeriesSpec::new("Date", "Search Trends"),
            stock: SeriesSpec::new("date", "close"),
        }
    }
}

impl LoaderEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let timestamp_format = env::var("TIMESTAMP_FORMAT").ok().filter(|s| !s.is_empty());

        let spec = |ts_key: &str, value_key: &str, fallback: &SeriesSpec| SeriesSpec {
            timestamp_column: env::var(ts_key)
                .ok()
                .or_else(|| fallback.timestamp_column.clone()),
            value_column: env::var(value_key)
                .ok()
                .or_else(|| fallback.value_column.clone()),
            timestamp_format: timestamp_format.clone(),
        };

        Self {
            search_csv_path: env::var("SEARCH_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.search_csv_path),
            stock_csv_path: env::var("STOCK_CSV_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.stock_csv_path),
            search: spec(
                "SEARCH_TIMESTAMP_COLUMN",
                "SEARCH_VALUE_COLUMN",
                &defaults.search,
            ),
            stock: spec(
                "STOCK_TIMESTAMP_COLUMN",
                "STOCK_VALUE_COLUMN",
                &defaults.stock,
            ),
        }
    }
}
