pub mod csv_source;
pub mod forecasting;
pub mod mock;

pub use mock::{FailingForecaster, MockForecaster};
