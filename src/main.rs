//! trendscope CLI
//!
//! Aligns hourly search interest with stock prices and reports correlations,
//! calendar profiles, monthly traffic and a search forecast.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;
use trendscope::application::ingest::timestamp::parse_timestamp;
use trendscope::application::pipeline::{
    AnalysisPipeline, default_forecaster, forecast_search, load_inputs,
};
use trendscope::application::reporting::AnalysisReporter;
use trendscope::application::seasonality::decompose_series;
use trendscope::application::traffic::compare_month;
use trendscope::config::Config;
use trendscope::domain::series::{DateRange, Timestamp};
use trendscope::infrastructure::csv_source::{write_features, write_forecast, write_to_file};

#[derive(Parser)]
#[command(author, version, about = "Search interest vs. stock price analysis", long_about = None)]
struct Cli {
    #[command(flatten)]
    sources: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hourly search-interest CSV
    #[arg(long, global = true)]
    search_csv: Option<PathBuf>,

    /// Hourly stock-price CSV
    #[arg(long, global = true)]
    stock_csv: Option<PathBuf>,
}

#[derive(Args)]
struct RangeArgs {
    /// First timestamp or date to include (e.g. 2020-01-01)
    #[arg(long)]
    from: Option<String>,

    /// Last timestamp or date to include; a bare date covers the whole day
    #[arg(long)]
    to: Option<String>,
}

impl RangeArgs {
    fn to_range(&self) -> Result<Option<DateRange>> {
        if self.from.is_none() && self.to.is_none() {
            return Ok(None);
        }
        let start = self.from.as_deref().map(|s| parse_bound(s, false)).transpose()?;
        let end = self.to.as_deref().map(|s| parse_bound(s, true)).transpose()?;
        DateRange::new(start, end)
            .map(Some)
            .context("Invalid range: --from must not be after --to")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Align both series, derive features, correlate and profile
    Analyze {
        /// Write the feature table as CSV
        #[arg(long)]
        features_out: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,

        /// Skip the search forecast
        #[arg(long)]
        no_forecast: bool,

        #[command(flatten)]
        range: RangeArgs,
    },
    /// Hour, weekday and week-of-year profiles of the search series
    Seasonality {
        /// Write the profiles as JSON
        #[arg(long)]
        json_out: Option<PathBuf>,

        #[command(flatten)]
        range: RangeArgs,
    },
    /// Compare one month's search traffic to the monthly median
    Traffic {
        /// Month to inspect (YYYY-MM)
        #[arg(short, long, default_value = "2020-05")]
        month: String,
    },
    /// Forecast the search series
    Forecast {
        /// Hours to forecast past the last observation
        #[arg(long)]
        horizon: Option<usize>,

        /// Write fitted and future points as CSV
        #[arg(long)]
        forecast_out: Option<PathBuf>,

        /// Rows shown at each end of the table
        #[arg(short, long, default_value = "5")]
        top_n: usize,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.sources)?;
    let reporter = AnalysisReporter;

    match cli.command {
        Commands::Analyze {
            features_out,
            json_out,
            no_forecast,
            range,
        } => {
            let window = range.to_range()?;
            let inputs = load_inputs(&config)?;
            let report = AnalysisPipeline::new(&config.features).run_within(
                &inputs.search,
                &inputs.stock,
                window,
            );

            reporter.print_summary(&report);
            reporter.print_correlation(&report.correlation);
            reporter.print_seasonality(&report.seasonality);

            if let Some(path) = features_out {
                write_to_file(&path, |f| write_features(f, &report.features))?;
                info!("Features written to {:?}", path);
            }
            if let Some(path) = json_out {
                reporter.save_json(&report, &path)?;
            }

            if config.forecast.enabled && !no_forecast {
                // A failed forecast leaves every other result intact
                match forecast_search(
                    default_forecaster(&config),
                    &inputs.search,
                    config.forecast.horizon_hours,
                ) {
                    Ok(forecast) => reporter.print_forecast(&forecast, 5),
                    Err(e) => warn!("Forecast skipped: {:#}", anyhow::Error::new(e)),
                }
            }
        }
        Commands::Seasonality { json_out, range } => {
            let window = range.to_range()?;
            let inputs = load_inputs(&config)?;
            let search = match window {
                Some(w) => inputs.search.slice_range(w),
                None => inputs.search,
            };
            let seasonality = decompose_series(&search);
            reporter.print_seasonality(&seasonality);
            if let Some(path) = json_out {
                reporter.save_json(&seasonality, &path)?;
            }
        }
        Commands::Traffic { month } => {
            let (year, month) = parse_month(&month)?;
            let inputs = load_inputs(&config)?;
            match compare_month(&inputs.search, year, month) {
                Some(cmp) => reporter.print_month_comparison(&cmp),
                None => warn!("Search series is empty; no monthly totals"),
            }
        }
        Commands::Forecast {
            horizon,
            forecast_out,
            top_n,
        } => {
            let inputs = load_inputs(&config)?;
            let horizon = horizon.unwrap_or(config.forecast.horizon_hours);
            let forecast = forecast_search(default_forecaster(&config), &inputs.search, horizon)?;
            reporter.print_forecast(&forecast, top_n);
            if let Some(path) = forecast_out {
                write_to_file(&path, |f| write_forecast(f, &forecast))?;
                info!("Forecast written to {:?}", path);
            }
        }
    }

    Ok(())
}

fn load_config(args: &SourceArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::from_toml_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(path) = &args.search_csv {
        config.sources.search_csv_path = path.clone();
    }
    if let Some(path) = &args.stock_csv {
        config.sources.stock_csv_path = path.clone();
    }
    Ok(config)
}

/// Bare dates start at midnight, or end at 23:59:59 for an upper bound.
fn parse_bound(s: &str, upper: bool) -> Result<Timestamp> {
    if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        let (h, m, sec) = if upper { (23, 59, 59) } else { (0, 0, 0) };
        return date
            .and_hms_opt(h, m, sec)
            .with_context(|| format!("Invalid date: {}", s));
    }
    parse_timestamp(s, None)
        .with_context(|| format!("Invalid timestamp: {}. Expected YYYY-MM-DD[ HH:MM:SS]", s))
}

fn parse_month(s: &str) -> Result<(i32, u32)> {
    let (year, month) = s
        .split_once('-')
        .with_context(|| format!("Invalid month: {}. Expected YYYY-MM", s))?;
    let year: i32 = year.parse().context("Failed to parse year")?;
    let month: u32 = month.parse().context("Failed to parse month")?;
    if !(1..=12).contains(&month) {
        anyhow::bail!("Invalid month: {}. Must be between 1 and 12", month);
    }
    Ok((year, month))
}
