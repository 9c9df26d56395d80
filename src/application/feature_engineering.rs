//! Derived columns over the aligned table.
//!
//! All lags and windows run in table order: the "previous" row is the previous
//! surviving row after alignment, not one calendar hour earlier.

use crate::domain::errors::InsufficientDataError;
use crate::domain::table::{AlignedTable, FeatureColumn, FeatureRow, FeatureTable};
use statrs::statistics::{Data, Distribution};
use tracing::{debug, warn};

pub const DEFAULT_VOLATILITY_WINDOW: usize = 4;

#[derive(Debug, Clone)]
pub struct FeatureDeriver {
    volatility_window: usize,
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new(DEFAULT_VOLATILITY_WINDOW)
    }
}

impl FeatureDeriver {
    /// A sample standard deviation needs at least two points, so smaller
    /// windows are raised to 2.
    pub fn new(volatility_window: usize) -> Self {
        Self {
            volatility_window: volatility_window.max(2),
        }
    }

    pub fn volatility_window(&self) -> usize {
        self.volatility_window
    }

    /// Adds `lagged_search`, `close_return`, `volatility` and `hourly_return`.
    pub fn derive(&self, table: &AlignedTable) -> FeatureTable {
        let search = table.search();
        let close = table.close();

        let lagged_search = lag(&search);
        let close_return = pct_change(&close);
        let volatility = rolling_std(&close_return, self.volatility_window);
        // Same formula under the name downstream consumers expect
        let hourly_return = close_return.clone();

        let rows: Vec<FeatureRow> = table
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| FeatureRow {
                timestamp: row.timestamp,
                search: row.search,
                close: row.close,
                lagged_search: lagged_search[i],
                close_return: close_return[i],
                volatility: volatility[i],
                hourly_return: hourly_return[i],
            })
            .collect();

        let features = FeatureTable::from_rows(rows);
        debug!(
            "Derived features for {} rows ({} with volatility)",
            features.len(),
            features.defined_count(FeatureColumn::Volatility)
        );
        features
    }

    /// Columns left entirely undefined for lack of rows.
    pub fn diagnostics(&self, features: &FeatureTable) -> Vec<InsufficientDataError> {
        let mut issues = Vec::new();

        if features.len() < 2 {
            issues.push(InsufficientDataError {
                computation: "close_return".to_string(),
                required: 2,
                available: features.len(),
            });
        }

        if features.defined_count(FeatureColumn::Volatility) == 0 {
            issues.push(InsufficientDataError {
                computation: "volatility".to_string(),
                required: self.volatility_window + 1,
                available: features.len(),
            });
        }

        for issue in &issues {
            warn!("{}", issue);
        }
        issues
    }
}

/// `out[i] = values[i - 1]`; the first row has no predecessor.
pub fn lag(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if !values.is_empty() {
        out.push(None);
        out.extend(values[..values.len() - 1].iter().map(|v| Some(*v)));
    }
    out
}

/// `out[i] = values[i] / values[i - 1] - 1`.
///
/// A zero (or non-finite result) yields `None` instead of an infinity.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }

    out.push(None);
    for pair in values.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        let change = if prev != 0.0 {
            Some(curr / prev - 1.0)
        } else {
            None
        };
        out.push(change.filter(|c| c.is_finite()));
    }
    out
}

/// Trailing sample standard deviation (N-1) over `window` rows ending at `i`.
///
/// Defined only when every value in the window is defined.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    for end in (window - 1)..values.len() {
        let slice = &values[end + 1 - window..=end];
        let Some(window_values) = slice.iter().copied().collect::<Option<Vec<f64>>>() else {
            continue;
        };
        out[end] = Data::new(window_values).std_dev();
    }
    out
}
