use crate::config::Config;
use crate::domain::table::FeatureColumn;
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

fn set(key: &str, value: &str) {
    // SAFETY: env mutation is serialised by ENV_LOCK
    unsafe { env::set_var(key, value) };
}

fn unset(key: &str) {
    // SAFETY: env mutation is serialised by ENV_LOCK
    unsafe { env::remove_var(key) };
}

#[test]
fn test_config_defaults() {
    let _guard = get_env_lock().lock().unwrap();
    for key in [
        "SEARCH_CSV_PATH",
        "VOLATILITY_WINDOW",
        "CORRELATION_COLUMNS",
        "FORECAST_HORIZON_HOURS",
        "FORECAST_CONFIDENCE",
    ] {
        unset(key);
    }

    let config = Config::from_env().unwrap();

    assert_eq!(config.features.volatility_window, 4);
    assert_eq!(
        config.features.correlation_columns,
        FeatureColumn::default_correlation_set()
    );
    assert_eq!(config.forecast.horizon_hours, 2000);
    assert!((config.forecast.confidence - 0.80).abs() < 1e-12);
    assert_eq!(
        config.sources.search.value_column.as_deref(),
        Some("Search Trends")
    );
    assert_eq!(config.sources.stock.value_column.as_deref(), Some("close"));
}

#[test]
fn test_config_env_overrides() {
    let _guard = get_env_lock().lock().unwrap();
    set("SEARCH_CSV_PATH", "/tmp/search.csv");
    set("VOLATILITY_WINDOW", "6");
    set("CORRELATION_COLUMNS", "volatility,search");
    set("FORECAST_HORIZON_HOURS", "24");

    let config = Config::from_env().unwrap();

    assert_eq!(
        config.sources.search_csv_path,
        PathBuf::from("/tmp/search.csv")
    );
    assert_eq!(config.features.volatility_window, 6);
    assert_eq!(
        config.features.correlation_columns,
        vec![FeatureColumn::Volatility, FeatureColumn::Search]
    );
    assert_eq!(config.forecast.horizon_hours, 24);

    // Cleanup
    unset("SEARCH_CSV_PATH");
    unset("VOLATILITY_WINDOW");
    unset("CORRELATION_COLUMNS");
    unset("FORECAST_HORIZON_HOURS");
}

#[test]
fn test_config_rejects_bad_values() {
    let _guard = get_env_lock().lock().unwrap();

    set("VOLATILITY_WINDOW", "1");
    assert!(Config::from_env().is_err());
    unset("VOLATILITY_WINDOW");

    set("FORECAST_CONFIDENCE", "1.5");
    assert!(Config::from_env().is_err());
    unset("FORECAST_CONFIDENCE");

    set("CORRELATION_COLUMNS", "volume");
    assert!(Config::from_env().is_err());
    unset("CORRELATION_COLUMNS");
}

#[test]
fn test_config_from_toml_keeps_defaults() {
    let config = Config::from_toml_str(
        r#"
        [sources]
        search_csv_path = "trends.csv"

        [sources.search]
        timestamp_column = "ds"
        value_column = "y"

        [features]
        correlation_columns = ["lagged_search", "hourly_return"]

        [forecast]
        horizon_hours = 0
        "#,
    )
    .unwrap();

    assert_eq!(config.sources.search_csv_path, PathBuf::from("trends.csv"));
    assert_eq!(config.sources.search.value_column.as_deref(), Some("y"));
    assert_eq!(config.features.volatility_window, 4);
    assert_eq!(config.features.correlation_columns.len(), 2);
    assert_eq!(config.forecast.horizon_hours, 0);
    assert!(config.forecast.enabled);
}

#[test]
fn test_config_from_toml_validates() {
    assert!(Config::from_toml_str("[features]\nvolatility_window = 1\n").is_err());
    assert!(Config::from_toml_str("[forecast]\nconfidence = 0.0\n").is_err());
}
