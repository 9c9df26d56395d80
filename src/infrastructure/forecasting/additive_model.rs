//! Additive trend + seasonality forecaster.
//!
//! y(t) = trend(t) + daily(hour) + weekly(weekday) + noise
//!
//! - trend: ordinary least squares line over hours since the first sample
//! - daily: mean detrended residual per hour of day
//! - weekly: mean remaining residual per ISO weekday
//! - interval: point ± z·σ, σ the sample std dev of the final residuals and
//!   z the two-sided standard normal quantile for the configured confidence

use crate::domain::errors::ForecastError;
use crate::domain::forecast::{ForecastPoint, ForecastSample};
use crate::domain::ports::{FittedForecast, Forecaster};
use crate::domain::series::Timestamp;
use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use statrs::statistics::{Data, Distribution};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditiveModelConfig {
    /// Interval width, e.g. 0.80 for an 80% band.
    pub confidence: f64,
    pub min_observations: usize,
    pub daily_seasonality: bool,
    pub weekly_seasonality: bool,
}

impl Default for AdditiveModelConfig {
    fn default() -> Self {
        Self {
            confidence: 0.80,
            min_observations: 48,
            daily_seasonality: true,
            weekly_seasonality: true,
        }
    }
}

pub struct AdditiveForecaster {
    config: AdditiveModelConfig,
}

impl AdditiveForecaster {
    pub fn new(config: AdditiveModelConfig) -> Self {
        Self { config }
    }
}

impl Default for AdditiveForecaster {
    fn default() -> Self {
        Self::new(AdditiveModelConfig::default())
    }
}

impl Forecaster for AdditiveForecaster {
    fn fit(&self, history: &[ForecastSample]) -> Result<Box<dyn FittedForecast>, ForecastError> {
        let required = self.config.min_observations.max(3);
        if history.len() < required {
            return Err(ForecastError::InsufficientData {
                required,
                available: history.len(),
            });
        }

        let origin = history[0].ds;
        let t: Vec<f64> = history.iter().map(|s| hours_since(origin, s.ds)).collect();
        let y: Vec<f64> = history.iter().map(|s| s.y).collect();

        let (intercept, slope) = fit_line(&t, &y).ok_or_else(|| ForecastError::NotConverged {
            reason: "degenerate time axis for trend fit".to_string(),
        })?;

        let mut residuals: Vec<f64> = t
            .iter()
            .zip(&y)
            .map(|(ti, yi)| yi - (intercept + slope * ti))
            .collect();

        let mut daily = [0.0; 24];
        if self.config.daily_seasonality {
            daily = bucket_means::<24>(history, &residuals, |ts| ts.hour() as usize);
            for (r, s) in residuals.iter_mut().zip(history) {
                *r -= daily[s.ds.hour() as usize];
            }
        }

        let mut weekly = [0.0; 7];
        if self.config.weekly_seasonality {
            weekly = bucket_means::<7>(history, &residuals, |ts| {
                ts.weekday().num_days_from_monday() as usize
            });
            for (r, s) in residuals.iter_mut().zip(history) {
                *r -= weekly[s.ds.weekday().num_days_from_monday() as usize];
            }
        }

        let sigma = Data::new(residuals).std_dev().unwrap_or(f64::NAN);
        if !sigma.is_finite() {
            return Err(ForecastError::NotConverged {
                reason: "residual variance is not finite".to_string(),
            });
        }

        let z = two_sided_z(self.config.confidence)?;
        debug!(
            "Additive fit: slope {:.6}/h, sigma {:.4}, z {:.3}",
            slope, sigma, z
        );

        Ok(Box::new(AdditiveModel {
            origin,
            intercept,
            slope,
            daily,
            weekly,
            half_width: z * sigma,
        }))
    }

    fn name(&self) -> &str {
        "additive"
    }
}

struct AdditiveModel {
    origin: Timestamp,
    intercept: f64,
    slope: f64,
    daily: [f64; 24],
    weekly: [f64; 7],
    half_width: f64,
}

impl FittedForecast for AdditiveModel {
    fn predict(&self, timestamps: &[Timestamp]) -> Result<Vec<ForecastPoint>, ForecastError> {
        Ok(timestamps
            .iter()
            .map(|ts| {
                let point = self.intercept
                    + self.slope * hours_since(self.origin, *ts)
                    + self.daily[ts.hour() as usize]
                    + self.weekly[ts.weekday().num_days_from_monday() as usize];
                ForecastPoint {
                    timestamp: *ts,
                    point,
                    lower: point - self.half_width,
                    upper: point + self.half_width,
                }
            })
            .collect())
    }
}

fn hours_since(origin: Timestamp, ts: Timestamp) -> f64 {
    (ts - origin).num_seconds() as f64 / 3600.0
}

/// Least squares `y = a + b·x`; `None` when `x` has no spread.
fn fit_line(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len() as f64;
    let sum_x: f64 = x.iter().sum();
    let sum_y: f64 = y.iter().sum();
    let sum_xy: f64 = x.iter().zip(y).map(|(xi, yi)| xi * yi).sum();
    let sum_x2: f64 = x.iter().map(|xi| xi * xi).sum();

    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < 1e-10 {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;
    Some((intercept, slope))
}

/// Mean residual per bucket; unobserved buckets contribute 0.
fn bucket_means<const N: usize>(
    history: &[ForecastSample],
    residuals: &[f64],
    bucket: impl Fn(&Timestamp) -> usize,
) -> [f64; N] {
    let mut sums = [0.0; N];
    let mut counts = [0usize; N];
    for (s, r) in history.iter().zip(residuals) {
        let b = bucket(&s.ds);
        sums[b] += r;
        counts[b] += 1;
    }
    let mut means = [0.0; N];
    for i in 0..N {
        if counts[i] > 0 {
            means[i] = sums[i] / counts[i] as f64;
        }
    }
    means
}

fn two_sided_z(confidence: f64) -> Result<f64, ForecastError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(ForecastError::NotConverged {
            reason: format!("confidence {} outside (0, 1)", confidence),
        });
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| ForecastError::NotConverged {
        reason: e.to_string(),
    })?;
    Ok(normal.inverse_cdf(0.5 + confidence / 2.0))
}
