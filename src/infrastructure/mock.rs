use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ForecastPoint, ForecastSample};
use crate::domain::ports::{FittedForecast, Forecaster};
use crate::domain::series::Timestamp;

/// Flat forecaster: predicts the sample mean with a fixed band.
#[derive(Debug, Clone)]
pub struct MockForecaster {
    pub band: f64,
    pub min_observations: usize,
    /// Drop the last requested point, to exercise response validation.
    pub truncate: bool,
}

impl Default for MockForecaster {
    fn default() -> Self {
        Self {
            band: 1.0,
            min_observations: 1,
            truncate: false,
        }
    }
}

impl MockForecaster {
    pub fn truncating() -> Self {
        Self {
            truncate: true,
            ..Self::default()
        }
    }

    pub fn with_min_observations(min_observations: usize) -> Self {
        Self {
            min_observations,
            ..Self::default()
        }
    }
}

impl Forecaster for MockForecaster {
    fn fit(&self, history: &[ForecastSample]) -> Result<Box<dyn FittedForecast>, ForecastError> {
        if history.len() < self.min_observations {
            return Err(ForecastError::InsufficientData {
                required: self.min_observations,
                available: history.len(),
            });
        }
        let mean = history.iter().map(|s| s.y).sum::<f64>() / history.len() as f64;
        Ok(Box::new(FlatModel {
            mean,
            band: self.band,
            truncate: self.truncate,
        }))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

struct FlatModel {
    mean: f64,
    band: f64,
    truncate: bool,
}

impl FittedForecast for FlatModel {
    fn predict(&self, timestamps: &[Timestamp]) -> Result<Vec<ForecastPoint>, ForecastError> {
        let take = if self.truncate {
            timestamps.len().saturating_sub(1)
        } else {
            timestamps.len()
        };
        Ok(timestamps[..take]
            .iter()
            .map(|ts| ForecastPoint {
                timestamp: *ts,
                point: self.mean,
                lower: self.mean - self.band,
                upper: self.mean + self.band,
            })
            .collect())
    }
}

/// Always fails to fit.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingForecaster;

impl Forecaster for FailingForecaster {
    fn fit(&self, _history: &[ForecastSample]) -> Result<Box<dyn FittedForecast>, ForecastError> {
        Err(ForecastError::NotConverged {
            reason: "optimizer diverged".to_string(),
        })
    }

    fn name(&self) -> &str {
        "failing"
    }
}
