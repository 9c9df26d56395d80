//! CSV adapters: raw table reading and export of series, feature tables and forecasts.

use crate::domain::errors::MalformedInputError;
use crate::domain::forecast::ForecastResult;
use crate::domain::raw_table::{RawRecord, RawTable};
use crate::domain::series::{TIMESTAMP_FORMAT, TimeSeries};
use crate::domain::table::FeatureTable;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Reads a headed CSV file into a raw table.
pub fn read_raw_table(path: &Path) -> Result<RawTable> {
    let file =
        File::open(path).with_context(|| format!("Failed to open CSV source {:?}", path))?;
    let table = read_raw_table_from(file)
        .with_context(|| format!("Failed to read CSV source {:?}", path))?;
    debug!("Read {} records from {:?}", table.records.len(), path);
    Ok(table)
}

pub fn read_raw_table_from<R: Read>(reader: R) -> Result<RawTable, MalformedInputError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(MalformedInputError::EmptyHeader);
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        records.push(RawRecord {
            line,
            fields: record.iter().map(str::to_string).collect(),
        });
    }

    Ok(RawTable { headers, records })
}

/// Writes a series as `timestamp_header,value_header` rows.
///
/// Timestamps use the canonical format so the output loads back unchanged.
pub fn write_series<W: Write>(
    writer: W,
    series: &TimeSeries,
    timestamp_header: &str,
    value_header: &str,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([timestamp_header, value_header])?;
    for point in series.iter() {
        let value = if point.is_missing() {
            String::new()
        } else {
            point.value.to_string()
        };
        wtr.write_record([point.timestamp.format(TIMESTAMP_FORMAT).to_string(), value])?;
    }
    wtr.flush().context("Failed to flush series CSV")?;
    Ok(())
}

#[derive(Serialize)]
struct FeatureCsvRow {
    timestamp: String,
    search: f64,
    close: f64,
    lagged_search: Option<f64>,
    close_return: Option<f64>,
    volatility: Option<f64>,
    hourly_return: Option<f64>,
}

/// Undefined cells are written as empty fields.
pub fn write_features<W: Write>(writer: W, table: &FeatureTable) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in table.rows() {
        wtr.serialize(FeatureCsvRow {
            timestamp: row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            search: row.search,
            close: row.close,
            lagged_search: row.lagged_search,
            close_return: row.close_return,
            volatility: row.volatility,
            hourly_return: row.hourly_return,
        })?;
    }
    wtr.flush().context("Failed to flush feature CSV")?;
    Ok(())
}

#[derive(Serialize)]
struct ForecastCsvRow {
    ds: String,
    yhat: f64,
    yhat_lower: f64,
    yhat_upper: f64,
}

pub fn write_forecast<W: Write>(writer: W, forecast: &ForecastResult) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in forecast.points() {
        wtr.serialize(ForecastCsvRow {
            ds: point.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            yhat: point.point,
            yhat_lower: point.lower,
            yhat_upper: point.upper,
        })?;
    }
    wtr.flush().context("Failed to flush forecast CSV")?;
    Ok(())
}

/// Creates `path` and hands its writer to `write`.
pub fn write_to_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(File) -> Result<()>,
{
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write(file).with_context(|| format!("Failed to write {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_raw_table_keeps_line_numbers() {
        let data = "Date,Search Trends\n2020-05-01 00:00:00,97\n2020-05-01 01:00:00,\n";
        let table = read_raw_table_from(data.as_bytes()).unwrap();

        assert_eq!(table.headers, vec!["Date", "Search Trends"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].line, 2);
        assert_eq!(table.records[1].line, 3);
        assert_eq!(table.records[1].fields[1], "");
    }

    #[test]
    fn test_write_features_leaves_undefined_cells_empty() {
        use crate::domain::table::FeatureRow;
        use chrono::NaiveDate;

        let ts = NaiveDate::from_ymd_opt(2020, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let table = FeatureTable::from_rows(vec![FeatureRow {
            timestamp: ts,
            search: 10.0,
            close: 100.0,
            lagged_search: None,
            close_return: None,
            volatility: None,
            hourly_return: None,
        }]);

        let mut out = Vec::new();
        write_features(&mut out, &table).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("timestamp,search,close,lagged_search,close_return,volatility,hourly_return")
        );
        assert_eq!(lines.next(), Some("2020-01-02 09:00:00,10.0,100.0,,,,"));
    }
}
