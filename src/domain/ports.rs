use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ForecastPoint, ForecastSample};
use crate::domain::series::Timestamp;

/// External time-series forecaster, consumed only through fit/predict.
///
/// Implementations are expected to return intervals symmetric around the point
/// estimate at a confidence level they own.
pub trait Forecaster: Send + Sync {
    /// Fit once on the full history.
    fn fit(&self, history: &[ForecastSample]) -> Result<Box<dyn FittedForecast>, ForecastError>;

    /// Get model name/type
    fn name(&self) -> &str;
}

/// Handle returned by [`Forecaster::fit`].
pub trait FittedForecast: Send + Sync {
    /// One point per requested timestamp, in the same order.
    fn predict(&self, timestamps: &[Timestamp]) -> Result<Vec<ForecastPoint>, ForecastError>;
}
