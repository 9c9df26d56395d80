//! Stage orchestration.
//!
//! Each stage receives its inputs as arguments and returns a new value, so the
//! same loaded series can feed several analyses without coordination.

use crate::application::alignment::align;
use crate::application::correlation::{self, correlation_matrix};
use crate::application::feature_engineering::FeatureDeriver;
use crate::application::forecasting::ForecastAdapter;
use crate::application::ingest::load_csv;
use crate::application::seasonality::decompose_aligned;
use crate::config::{Config, FeatureEnvConfig};
use crate::domain::correlation::CorrelationMatrix;
use crate::domain::errors::{ForecastUnavailableError, InsufficientDataError};
use crate::domain::forecast::ForecastResult;
use crate::domain::ports::Forecaster;
use crate::domain::seasonal::SeasonalDecomposition;
use crate::domain::series::{DateRange, TimeSeries};
use crate::domain::table::{FeatureColumn, FeatureTable};
use crate::infrastructure::forecasting::AdditiveForecaster;
use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Search and price series as loaded from their sources.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub search: TimeSeries,
    pub stock: TimeSeries,
}

pub fn load_inputs(config: &Config) -> Result<Inputs> {
    let sources = &config.sources;
    let search = load_csv(&sources.search_csv_path, &sources.search)
        .context("Failed to load search series")?;
    let stock = load_csv(&sources.stock_csv_path, &sources.stock)
        .context("Failed to load stock series")?;
    Ok(Inputs { search, stock })
}

/// Everything computed from the aligned table.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Window the results were restricted to, if any.
    pub window: Option<DateRange>,
    pub search_points: usize,
    pub stock_points: usize,
    pub aligned_rows: usize,
    pub features: FeatureTable,
    pub correlation: CorrelationMatrix,
    pub seasonality: SeasonalDecomposition,
    /// Computations left undefined for lack of data; never fatal.
    pub diagnostics: Vec<InsufficientDataError>,
}

pub struct AnalysisPipeline {
    deriver: FeatureDeriver,
    correlation_columns: Vec<FeatureColumn>,
}

impl Default for AnalysisPipeline {
    fn default() -> Self {
        Self::new(&FeatureEnvConfig::default())
    }
}

impl AnalysisPipeline {
    pub fn new(config: &FeatureEnvConfig) -> Self {
        Self {
            deriver: FeatureDeriver::new(config.volatility_window),
            correlation_columns: config.correlation_columns.clone(),
        }
    }

    /// Align → {seasonal profiles, features → correlation}.
    ///
    /// Seasonal decomposition and feature derivation only read the aligned
    /// table, so they run side by side.
    pub fn run(&self, search: &TimeSeries, stock: &TimeSeries) -> AnalysisReport {
        self.run_within(search, stock, None)
    }

    /// Like [`run`](Self::run), with every result restricted to `window`.
    ///
    /// Features are derived on the full aligned table and sliced afterwards,
    /// so lags and volatility at the start of the window still use the hours
    /// before it.
    pub fn run_within(
        &self,
        search: &TimeSeries,
        stock: &TimeSeries,
        window: Option<DateRange>,
    ) -> AnalysisReport {
        let full = align(search, stock);
        let aligned = match window {
            Some(w) => full.slice(w.start, w.end),
            None => full.clone(),
        };

        let (seasonality, features) = rayon::join(
            || decompose_aligned(&aligned),
            || {
                let features = self.deriver.derive(&full);
                match window {
                    Some(w) => features.slice(w.start, w.end),
                    None => features,
                }
            },
        );

        let correlation = correlation_matrix(&features, &self.correlation_columns);

        let mut diagnostics = self.deriver.diagnostics(&features);
        diagnostics.extend(correlation::diagnostics(&correlation));

        info!(
            "Analysis complete: {} aligned rows, {} diagnostics",
            aligned.len(),
            diagnostics.len()
        );

        AnalysisReport {
            window,
            search_points: search.len(),
            stock_points: stock.len(),
            aligned_rows: aligned.len(),
            features,
            correlation,
            seasonality,
            diagnostics,
        }
    }
}

/// Forecaster selected by configuration.
pub fn default_forecaster(config: &Config) -> Arc<dyn Forecaster> {
    Arc::new(AdditiveForecaster::new(config.forecast.model_config()))
}

/// Forecast of the search series with the configured horizon.
///
/// Failure here is isolated: callers keep every other result.
pub fn forecast_search(
    forecaster: Arc<dyn Forecaster>,
    search: &TimeSeries,
    horizon: usize,
) -> Result<ForecastResult, ForecastUnavailableError> {
    ForecastAdapter::new(forecaster).forecast(search, horizon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::{TimePoint, Timestamp};
    use chrono::{Duration, NaiveDate};

    fn start() -> Timestamp {
        NaiveDate::from_ymd_opt(2020, 1, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn series(name: &str, values: &[f64]) -> TimeSeries {
        TimeSeries::new(
            name,
            values
                .iter()
                .enumerate()
                .map(|(i, v)| TimePoint::new(start() + Duration::hours(i as i64), *v))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_reports_insufficient_data_without_failing() {
        let search = series("search", &[10.0, 20.0, 30.0]);
        let stock = series("close", &[100.0, 101.0, 102.0]);

        let report = AnalysisPipeline::default().run(&search, &stock);

        assert_eq!(report.aligned_rows, 3);
        assert!(report
            .diagnostics
            .iter()
            .any(|d| d.computation == "volatility" && d.required == 5));
        assert_eq!(
            report
                .correlation
                .get(FeatureColumn::Volatility, FeatureColumn::LaggedSearch),
            None
        );
        assert_eq!(report.seasonality.hour_of_day.len(), 3);
    }

    #[test]
    fn test_run_within_window_keeps_history_before_start() {
        let search: Vec<f64> = (0..30).map(|i| (i % 6) as f64).collect();
        let close: Vec<f64> = (0..30).map(|i| 100.0 + ((i * 7) % 5) as f64).collect();
        let (search, stock) = (series("s", &search), series("c", &close));
        let window = DateRange::new(
            Some(start() + Duration::hours(10)),
            Some(start() + Duration::hours(19)),
        );

        let full = AnalysisPipeline::default().run(&search, &stock);
        let windowed = AnalysisPipeline::default().run_within(&search, &stock, window);

        assert_eq!(windowed.window, window);
        assert_eq!(windowed.aligned_rows, 10);
        assert_eq!(windowed.features.rows(), &full.features.rows()[10..20]);
        // Volatility is defined from the first row, borrowing the prior hours
        assert_eq!(windowed.features.defined_count(FeatureColumn::Volatility), 10);
        assert_eq!(windowed.seasonality.hour_of_day.len(), 10);
    }

    #[test]
    fn test_run_on_sufficient_data() {
        let search: Vec<f64> = (0..30).map(|i| 50.0 + (i % 7) as f64).collect();
        let close: Vec<f64> = (0..30).map(|i| 100.0 + ((i * 13) % 5) as f64).collect();

        let report = AnalysisPipeline::default().run(&series("s", &search), &series("c", &close));

        assert_eq!(report.features.len(), 30);
        assert_eq!(report.features.defined_count(FeatureColumn::Volatility), 26);
        for c in FeatureColumn::default_correlation_set() {
            assert_eq!(report.correlation.get(c, c), Some(1.0));
        }
    }
}
