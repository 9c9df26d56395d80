use super::timestamp::parse_timestamp;
use crate::domain::errors::MalformedInputError;
use crate::domain::raw_table::RawTable;
use crate::domain::series::{TIMESTAMP_FORMAT, TimePoint, TimeSeries, Timestamp};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Cell contents treated as a missing observation.
const MISSING_MARKERS: &[&str] = &["", "nan", "na", "n/a", "null", "none"];

/// Column selection and parsing options for one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesSpec {
    /// Timestamp column; the first column when unset.
    pub timestamp_column: Option<String>,
    /// Value column; the only other column when unset.
    pub value_column: Option<String>,
    /// Explicit chrono format; common ISO and US layouts are tried when unset.
    pub timestamp_format: Option<String>,
}

impl SeriesSpec {
    pub fn new(timestamp_column: &str, value_column: &str) -> Self {
        Self {
            timestamp_column: Some(timestamp_column.to_string()),
            value_column: Some(value_column.to_string()),
            timestamp_format: None,
        }
    }
}

/// Parses raw tables into strictly ordered series.
///
/// Rows are never re-ordered: any timestamp that does not move forward is an
/// error. Rows with a missing value are dropped.
pub struct SeriesLoader {
    spec: SeriesSpec,
}

impl SeriesLoader {
    pub fn new(spec: SeriesSpec) -> Self {
        Self { spec }
    }

    pub fn load(&self, table: &RawTable) -> Result<TimeSeries, MalformedInputError> {
        let (ts_idx, value_idx) = self.resolve_columns(table)?;
        let value_name = table.headers[value_idx].trim().to_string();
        let format = self.spec.timestamp_format.as_deref();

        let mut points = Vec::with_capacity(table.records.len());
        let mut previous: Option<Timestamp> = None;
        let mut dropped = 0usize;

        for record in &table.records {
            let raw_ts = record.fields.get(ts_idx).map(String::as_str).unwrap_or("");
            let timestamp = parse_timestamp(raw_ts, format).ok_or_else(|| {
                MalformedInputError::UnparseableTimestamp {
                    line: record.line,
                    value: raw_ts.to_string(),
                }
            })?;

            if let Some(prev) = previous {
                if timestamp == prev {
                    return Err(MalformedInputError::DuplicateTimestamp {
                        line: record.line,
                        timestamp: timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    });
                }
                if timestamp < prev {
                    return Err(MalformedInputError::NonMonotonicTimestamp {
                        line: record.line,
                        previous: prev.format(TIMESTAMP_FORMAT).to_string(),
                        current: timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    });
                }
            }
            previous = Some(timestamp);

            let raw_value = record.fields.get(value_idx).map(String::as_str).unwrap_or("");
            match parse_value(raw_value) {
                Ok(Some(value)) => points.push(TimePoint::new(timestamp, value)),
                Ok(None) => dropped += 1,
                Err(()) => {
                    return Err(MalformedInputError::UnparseableValue {
                        line: record.line,
                        value: raw_value.to_string(),
                    });
                }
            }
        }

        if dropped > 0 {
            debug!("Dropped {} rows with missing '{}'", dropped, value_name);
        }
        info!(
            "Loaded {} points for '{}' ({} dropped)",
            points.len(),
            value_name,
            dropped
        );

        TimeSeries::new(value_name, points)
    }

    fn resolve_columns(&self, table: &RawTable) -> Result<(usize, usize), MalformedInputError> {
        if table.headers.is_empty() {
            return Err(MalformedInputError::EmptyHeader);
        }

        let find = |name: &String| {
            table
                .column_index(name)
                .ok_or_else(|| MalformedInputError::MissingColumn {
                    column: name.clone(),
                    available: table.headers.clone(),
                })
        };

        let ts_idx = match &self.spec.timestamp_column {
            Some(name) => find(name)?,
            None => 0,
        };

        let value_idx = match &self.spec.value_column {
            Some(name) => find(name)?,
            None => {
                let others: Vec<usize> = (0..table.headers.len()).filter(|&i| i != ts_idx).collect();
                match others.as_slice() {
                    [only] => *only,
                    _ => {
                        return Err(MalformedInputError::UnexpectedColumnCount {
                            found: table.headers.len(),
                        });
                    }
                }
            }
        };

        Ok((ts_idx, value_idx))
    }
}

/// `Ok(None)` for a missing marker, `Err` for anything else that is not a finite number.
fn parse_value(raw: &str) -> Result<Option<f64>, ()> {
    let raw = raw.trim();
    if MISSING_MARKERS.iter().any(|m| raw.eq_ignore_ascii_case(m)) {
        return Ok(None);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(()),
    }
}
