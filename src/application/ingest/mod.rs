pub mod series_loader;
pub mod timestamp;

pub use series_loader::{SeriesLoader, SeriesSpec};

use crate::domain::series::TimeSeries;
use crate::infrastructure::csv_source::read_raw_table;
use anyhow::{Context, Result};
use std::path::Path;

/// Reads and loads one CSV source.
pub fn load_csv(path: &Path, spec: &SeriesSpec) -> Result<TimeSeries> {
    let table = read_raw_table(path)?;
    SeriesLoader::new(spec.clone())
        .load(&table)
        .with_context(|| format!("Malformed input in {:?}", path))
}
