//! Reporting utilities for analysis results.
//!
//! Provides formatted console output and JSON export capabilities.

use crate::application::pipeline::AnalysisReport;
use crate::application::traffic::MonthComparison;
use crate::domain::correlation::CorrelationMatrix;
use crate::domain::forecast::ForecastResult;
use crate::domain::seasonal::{SeasonalDecomposition, SeasonalProfile, weekday_name};
use crate::domain::series::TIMESTAMP_FORMAT;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Undefined values print as `n/a`, never as a number.
fn cell(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "n/a".to_string(),
    }
}

#[derive(Default)]
pub struct AnalysisReporter;

impl AnalysisReporter {
    pub fn print_summary(&self, report: &AnalysisReport) {
        println!("\n{}", "=".repeat(72));
        println!("  SEARCH / PRICE ANALYSIS");
        println!("{}", "=".repeat(72));
        println!("  Search points:   {}", report.search_points);
        println!("  Stock points:    {}", report.stock_points);
        println!("  Aligned rows:    {}", report.aligned_rows);

        if !report.diagnostics.is_empty() {
            println!("\n  Undefined results:");
            for d in &report.diagnostics {
                println!("    - {}", d);
            }
        }
    }

    pub fn print_correlation(&self, matrix: &CorrelationMatrix) {
        println!("\n📊 Correlation (pairwise complete):");
        print!("{:<16}", "");
        for c in matrix.columns() {
            print!(" {:>14}", c.as_str());
        }
        println!();
        for (i, c) in matrix.columns().iter().enumerate() {
            print!("{:<16}", c.as_str());
            for v in matrix.row(i) {
                print!(" {:>14}", cell(*v, 6));
            }
            println!();
        }
    }

    pub fn print_seasonality(&self, seasonality: &SeasonalDecomposition) {
        println!("\n🕒 Average by hour of day:");
        self.print_profile(&seasonality.hour_of_day, |h| format!("{:02}:00", h));

        println!("\n📅 Average by ISO weekday:");
        self.print_profile(&seasonality.iso_weekday, |d| weekday_name(*d).to_string());

        println!("\n🗓  Average by ISO week:");
        self.print_profile(&seasonality.iso_week, |w| format!("week {:02}", w));

        if let Some((h, m)) = seasonality.hour_of_day.peak() {
            println!("\n  Busiest hour:     {:02}:00 ({:.2})", h, m);
        }
        if let Some((d, m)) = seasonality.iso_weekday.peak() {
            println!("  Busiest weekday:  {} ({:.2})", weekday_name(d), m);
        }
        if let Some((w, m)) = seasonality.iso_week.trough() {
            println!("  Quietest week:    {} ({:.2})", w, m);
        }
    }

    fn print_profile<K, F>(&self, profile: &SeasonalProfile<K>, label: F)
    where
        K: Ord + Copy,
        F: Fn(&K) -> String,
    {
        for (k, stats) in profile.iter() {
            println!(
                "  {:<12} {:>10}  (n={})",
                label(k),
                cell(stats.mean, 2),
                stats.observations
            );
        }
    }

    pub fn print_month_comparison(&self, cmp: &MonthComparison) {
        println!("\n🔎 Search traffic {}-{:02}:", cmp.year, cmp.month);
        println!("  Month total:           {:.0}", cmp.total);
        println!("  Median monthly total:  {:.0}", cmp.median_monthly_total);
        println!("  Ratio:                 {}", cell(cmp.ratio, 3));
        println!(
            "  The month is {} than the overall monthly median.",
            cmp.comparison
        );
    }

    /// Prints the first and last `n` forecast rows.
    pub fn print_forecast(&self, forecast: &ForecastResult, n: usize) {
        println!(
            "\n🔮 Forecast ({}): {} fitted + {} future points, last observed {}",
            forecast.forecaster(),
            forecast.historical().len(),
            forecast.future().len(),
            forecast.last_observed().format(TIMESTAMP_FORMAT)
        );
        println!(
            "  {:<20} | {:>10} | {:>10} | {:>10}",
            "ds", "yhat", "yhat_lower", "yhat_upper"
        );
        println!("  {}", "-".repeat(60));

        let points = forecast.points();
        let head = points.len().min(n);
        let tail_start = points.len().saturating_sub(n).max(head);
        for p in points[..head].iter().chain(points[tail_start..].iter()) {
            println!(
                "  {:<20} | {:>10.3} | {:>10.3} | {:>10.3}",
                p.timestamp.format(TIMESTAMP_FORMAT),
                p.point,
                p.lower,
                p.upper
            );
        }
    }

    /// Saves any serializable result as pretty JSON.
    pub fn save_json<T: Serialize>(&self, value: &T, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
        println!("\n💾 Saved to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_never_renders_missing_as_zero() {
        assert_eq!(cell(None, 4), "n/a");
        assert_eq!(cell(Some(0.0), 2), "0.00");
    }
}
