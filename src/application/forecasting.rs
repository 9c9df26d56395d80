use crate::domain::errors::{ForecastError, ForecastUnavailableError};
use crate::domain::forecast::{ForecastPoint, ForecastResult, ForecastSample};
use crate::domain::ports::Forecaster;
use crate::domain::series::{TimeSeries, Timestamp};
use chrono::Duration;
use std::sync::Arc;
use tracing::{info, warn};

/// Bridges a series to an external [`Forecaster`].
///
/// One fit, one predict, no retry. Every failure becomes a
/// [`ForecastUnavailableError`]; an empty or zero forecast is never returned
/// in its place.
pub struct ForecastAdapter {
    forecaster: Arc<dyn Forecaster>,
}

impl ForecastAdapter {
    pub fn new(forecaster: Arc<dyn Forecaster>) -> Self {
        Self { forecaster }
    }

    /// Reshapes a series into `(ds, y)` samples, skipping missing values.
    pub fn to_samples(series: &TimeSeries) -> Vec<ForecastSample> {
        series
            .observed()
            .map(|p| ForecastSample {
                ds: p.timestamp,
                y: p.value,
            })
            .collect()
    }

    /// `horizon` hourly steps after `last`.
    ///
    /// Fails when the final step falls outside the representable calendar.
    pub fn future_timestamps(
        last: Timestamp,
        horizon: usize,
    ) -> Result<Vec<Timestamp>, ForecastError> {
        let out_of_range = || ForecastError::HorizonOutOfRange { horizon };
        let hours = i64::try_from(horizon).map_err(|_| out_of_range())?;
        let span = Duration::try_hours(hours).ok_or_else(out_of_range)?;
        last.checked_add_signed(span).ok_or_else(out_of_range)?;

        // Every step is at most `span`, which was just checked
        Ok((1..=hours).map(|h| last + Duration::hours(h)).collect())
    }

    /// Fitted values over the history plus `horizon` hourly steps past the last observation.
    pub fn forecast(
        &self,
        series: &TimeSeries,
        horizon: usize,
    ) -> Result<ForecastResult, ForecastUnavailableError> {
        let samples = Self::to_samples(series);
        let Some(last) = samples.last().map(|s| s.ds) else {
            return Err(self.unavailable(ForecastError::InsufficientData {
                required: 1,
                available: 0,
            }));
        };

        let future = Self::future_timestamps(last, horizon).map_err(|e| self.unavailable(e))?;

        info!(
            "Fitting {} on {} samples (horizon {}h)",
            self.forecaster.name(),
            samples.len(),
            horizon
        );
        let model = self
            .forecaster
            .fit(&samples)
            .map_err(|e| self.unavailable(e))?;

        let mut timestamps: Vec<Timestamp> = samples.iter().map(|s| s.ds).collect();
        timestamps.extend(future);

        let points = model
            .predict(&timestamps)
            .map_err(|e| self.unavailable(e))?;
        validate_response(&timestamps, &points).map_err(|e| self.unavailable(e))?;

        Ok(ForecastResult::new(
            self.forecaster.name().to_string(),
            last,
            horizon,
            points,
        ))
    }

    fn unavailable(&self, source: ForecastError) -> ForecastUnavailableError {
        let err = ForecastUnavailableError {
            forecaster: self.forecaster.name().to_string(),
            source,
        };
        warn!("{}", err);
        err
    }
}

fn validate_response(requested: &[Timestamp], points: &[ForecastPoint]) -> Result<(), ForecastError> {
    if requested.len() != points.len() {
        return Err(ForecastError::InvalidResponse {
            reason: format!(
                "expected {} points, got {}",
                requested.len(),
                points.len()
            ),
        });
    }

    for (ts, p) in requested.iter().zip(points) {
        if p.timestamp != *ts {
            return Err(ForecastError::InvalidResponse {
                reason: format!("point for {} returned as {}", ts, p.timestamp),
            });
        }
        if !(p.point.is_finite() && p.lower.is_finite() && p.upper.is_finite()) {
            return Err(ForecastError::InvalidResponse {
                reason: format!("non-finite estimate at {}", ts),
            });
        }
        if p.lower > p.point || p.point > p.upper {
            return Err(ForecastError::InvalidResponse {
                reason: format!("interval does not contain the estimate at {}", ts),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mock::{FailingForecaster, MockForecaster};
    use crate::domain::series::TimePoint;
    use chrono::NaiveDate;

    fn hourly_series(n: i64) -> TimeSeries {
        let start = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        TimeSeries::new(
            "search",
            (0..n)
                .map(|h| TimePoint::new(start + Duration::hours(h), h as f64))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_future_timestamps_are_hourly() {
        let last = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        let future = ForecastAdapter::future_timestamps(last, 2).unwrap();
        assert_eq!(future[0], last + Duration::hours(1));
        assert_eq!(future[1].to_string(), "2020-05-02 01:00:00");
        assert!(ForecastAdapter::future_timestamps(last, 0).unwrap().is_empty());
    }

    #[test]
    fn test_future_timestamps_reject_unrepresentable_horizon() {
        let last = NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        for horizon in [usize::MAX, i64::MAX as usize, 5_000_000_000] {
            assert_eq!(
                ForecastAdapter::future_timestamps(last, horizon),
                Err(ForecastError::HorizonOutOfRange { horizon })
            );
        }
    }

    #[test]
    fn test_oversized_horizon_is_unavailable_before_fitting() {
        let adapter = ForecastAdapter::new(Arc::new(MockForecaster::default()));
        let err = adapter.forecast(&hourly_series(10), usize::MAX).unwrap_err();
        assert_eq!(err.forecaster, "mock");
        assert!(matches!(
            err.source,
            ForecastError::HorizonOutOfRange { .. }
        ));
    }

    #[test]
    fn test_forecast_splits_history_and_horizon() {
        let adapter = ForecastAdapter::new(Arc::new(MockForecaster::default()));
        let series = hourly_series(10);

        let result = adapter.forecast(&series, 3).unwrap();
        assert_eq!(result.len(), 13);
        assert_eq!(result.historical().len(), 10);
        assert_eq!(result.future().len(), 3);
        assert!(result.future().iter().all(|p| p.timestamp > result.last_observed()));
    }

    #[test]
    fn test_empty_series_is_unavailable() {
        let adapter = ForecastAdapter::new(Arc::new(MockForecaster::default()));
        let err = adapter
            .forecast(&TimeSeries::empty("search"), 5)
            .unwrap_err();
        assert!(matches!(err.source, ForecastError::InsufficientData { .. }));
    }

    #[test]
    fn test_forecaster_failure_propagates() {
        let adapter = ForecastAdapter::new(Arc::new(FailingForecaster));
        let err = adapter.forecast(&hourly_series(50), 5).unwrap_err();
        assert_eq!(err.forecaster, "failing");
        assert!(matches!(err.source, ForecastError::NotConverged { .. }));
    }

    #[test]
    fn test_short_response_is_rejected() {
        let adapter = ForecastAdapter::new(Arc::new(MockForecaster::truncating()));
        let err = adapter.forecast(&hourly_series(5), 2).unwrap_err();
        assert!(matches!(err.source, ForecastError::InvalidResponse { .. }));
    }
}
