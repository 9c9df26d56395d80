use serde::Serialize;
use thiserror::Error;

/// Errors raised while turning a raw table into a time-indexed series.
///
/// Every variant is fatal for the load that produced it. Line numbers refer to
/// the physical line in the source (the header is line 1).
#[derive(Debug, Error)]
pub enum MalformedInputError {
    #[error("Missing required column '{column}' (available: {available:?})")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    #[error("Expected a timestamp column and exactly one value column, found {found} columns")]
    UnexpectedColumnCount { found: usize },

    #[error("Source has no header row")]
    EmptyHeader,

    #[error("Line {line}: unparseable timestamp '{value}'")]
    UnparseableTimestamp { line: u64, value: String },

    #[error("Line {line}: unparseable value '{value}'")]
    UnparseableValue { line: u64, value: String },

    #[error("Line {line}: timestamp {current} goes backwards from {previous}")]
    NonMonotonicTimestamp {
        line: u64,
        previous: String,
        current: String,
    },

    #[error("Line {line}: duplicate timestamp {timestamp}")]
    DuplicateTimestamp { line: u64, timestamp: String },

    #[error("Failed to read source: {0}")]
    Read(#[from] csv::Error),
}

impl MalformedInputError {
    /// Source line of the offending row, when the error is row-specific.
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::UnparseableTimestamp { line, .. }
            | Self::UnparseableValue { line, .. }
            | Self::NonMonotonicTimestamp { line, .. }
            | Self::DuplicateTimestamp { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// A computation that could not be carried out for lack of observations.
///
/// Never fatal: the affected cell or column is left undefined and this value
/// is kept as a diagnostic alongside the results.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("Insufficient data for {computation}: need {required}, have {available}")]
pub struct InsufficientDataError {
    pub computation: String,
    pub required: usize,
    pub available: usize,
}

/// Failures reported by a forecaster implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("Forecaster needs at least {required} observations, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Model did not converge: {reason}")]
    NotConverged { reason: String },

    #[error("Invalid forecaster response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Horizon of {horizon} hours runs past the supported calendar")]
    HorizonOutOfRange { horizon: usize },
}

/// Raised by the forecast adapter whenever no forecast can be produced.
///
/// Callers decide whether to continue without a forecast; there is no fallback.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Forecast unavailable from {forecaster}: {source}")]
pub struct ForecastUnavailableError {
    pub forecaster: String,
    #[source]
    pub source: ForecastError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_input_formatting() {
        let err = MalformedInputError::NonMonotonicTimestamp {
            line: 7,
            previous: "2020-05-01 10:00:00".to_string(),
            current: "2020-05-01 09:00:00".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("Line 7"));
        assert!(msg.contains("09:00:00"));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn test_missing_column_has_no_line() {
        let err = MalformedInputError::MissingColumn {
            column: "close".to_string(),
            available: vec!["date".to_string()],
        };
        assert_eq!(err.line(), None);
        assert!(err.to_string().contains("close"));
    }

    #[test]
    fn test_forecast_unavailable_formatting() {
        let err = ForecastUnavailableError {
            forecaster: "additive".to_string(),
            source: ForecastError::InsufficientData {
                required: 48,
                available: 3,
            },
        };

        let msg = err.to_string();
        assert!(msg.contains("additive"));
        assert!(msg.contains("48"));
    }
}
