// CSV ingestion and timestamp parsing
pub mod ingest;

// Series alignment and derived features
pub mod alignment;
pub mod feature_engineering;

// Statistical summaries
pub mod correlation;
pub mod seasonality;
pub mod traffic;

// Forecasting over an external model
pub mod forecasting;

// Stage orchestration
pub mod pipeline;

pub mod reporting;
