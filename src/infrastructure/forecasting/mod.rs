pub mod additive_model;

pub use additive_model::{AdditiveForecaster, AdditiveModelConfig};
