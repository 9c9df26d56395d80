use crate::domain::series::Timestamp;
use serde::{Deserialize, Serialize};

/// One row of the forecaster's two-column input schema.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub ds: Timestamp,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: Timestamp,
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Fitted history followed by the future horizon, in timestamp order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    forecaster: String,
    last_observed: Timestamp,
    horizon: usize,
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub(crate) fn new(
        forecaster: String,
        last_observed: Timestamp,
        horizon: usize,
        points: Vec<ForecastPoint>,
    ) -> Self {
        Self {
            forecaster,
            last_observed,
            horizon,
            points,
        }
    }

    pub fn forecaster(&self) -> &str {
        &self.forecaster
    }

    pub fn last_observed(&self) -> Timestamp {
        self.last_observed
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points at or before the last observation.
    pub fn historical(&self) -> &[ForecastPoint] {
        let split = self.points.len() - self.horizon;
        &self.points[..split]
    }

    /// Points strictly after the last observation.
    pub fn future(&self) -> &[ForecastPoint] {
        let split = self.points.len() - self.horizon;
        &self.points[split..]
    }
}
