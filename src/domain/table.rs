use crate::domain::series::Timestamp;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One timestamp present in both source series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub timestamp: Timestamp,
    pub search: f64,
    pub close: f64,
}

/// Strict intersection of the search and price series, sorted by timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlignedTable {
    rows: Vec<AlignedRow>,
}

impl AlignedTable {
    /// Rows must already be sorted ascending with unique timestamps.
    pub(crate) fn from_sorted_rows(rows: Vec<AlignedRow>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        Self { rows }
    }

    pub fn rows(&self) -> &[AlignedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn search(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.search).collect()
    }

    pub fn close(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.close).collect()
    }

    /// Inclusive date-range slice.
    pub fn slice(&self, start: Timestamp, end: Timestamp) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .copied()
            .collect();
        Self { rows }
    }
}

/// Aligned row extended with the derived features. `None` marks an undefined cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub timestamp: Timestamp,
    pub search: f64,
    pub close: f64,
    pub lagged_search: Option<f64>,
    pub close_return: Option<f64>,
    pub volatility: Option<f64>,
    pub hourly_return: Option<f64>,
}

impl FeatureRow {
    pub fn get(&self, column: FeatureColumn) -> Option<f64> {
        match column {
            FeatureColumn::Search => Some(self.search),
            FeatureColumn::Close => Some(self.close),
            FeatureColumn::LaggedSearch => self.lagged_search,
            FeatureColumn::CloseReturn => self.close_return,
            FeatureColumn::Volatility => self.volatility,
            FeatureColumn::HourlyReturn => self.hourly_return,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub(crate) fn from_rows(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, column: FeatureColumn) -> Vec<Option<f64>> {
        self.rows.iter().map(|r| r.get(column)).collect()
    }

    /// Number of defined cells in a column.
    pub fn defined_count(&self, column: FeatureColumn) -> usize {
        self.rows.iter().filter(|r| r.get(column).is_some()).count()
    }

    /// Inclusive date-range slice. Derived values keep what they were computed
    /// from the full table.
    pub fn slice(&self, start: Timestamp, end: Timestamp) -> Self {
        let rows = self
            .rows
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .copied()
            .collect();
        Self { rows }
    }
}

/// Named numeric column of a feature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureColumn {
    Search,
    Close,
    LaggedSearch,
    CloseReturn,
    Volatility,
    HourlyReturn,
}

impl FeatureColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureColumn::Search => "search",
            FeatureColumn::Close => "close",
            FeatureColumn::LaggedSearch => "lagged_search",
            FeatureColumn::CloseReturn => "close_return",
            FeatureColumn::Volatility => "volatility",
            FeatureColumn::HourlyReturn => "hourly_return",
        }
    }

    pub fn all() -> Vec<FeatureColumn> {
        vec![
            FeatureColumn::Search,
            FeatureColumn::Close,
            FeatureColumn::LaggedSearch,
            FeatureColumn::CloseReturn,
            FeatureColumn::Volatility,
            FeatureColumn::HourlyReturn,
        ]
    }

    /// Subset correlated by default: volatility, lagged search, hourly return.
    pub fn default_correlation_set() -> Vec<FeatureColumn> {
        vec![
            FeatureColumn::Volatility,
            FeatureColumn::LaggedSearch,
            FeatureColumn::HourlyReturn,
        ]
    }

    /// Parses a comma separated list such as `volatility,lagged_search`.
    pub fn parse_list(s: &str) -> anyhow::Result<Vec<FeatureColumn>> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(FeatureColumn::from_str)
            .collect()
    }
}

impl fmt::Display for FeatureColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "search" | "search_trends" => Ok(FeatureColumn::Search),
            "close" => Ok(FeatureColumn::Close),
            "lagged_search" | "lagged_search_trends" => Ok(FeatureColumn::LaggedSearch),
            "close_return" => Ok(FeatureColumn::CloseReturn),
            "volatility" | "stock_volatility" => Ok(FeatureColumn::Volatility),
            "hourly_return" | "hourly_stock_return" => Ok(FeatureColumn::HourlyReturn),
            _ => Err(anyhow!(
                "Invalid feature column: {}. Must be one of {:?}",
                s,
                FeatureColumn::all()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
            )),
        }
    }
}
