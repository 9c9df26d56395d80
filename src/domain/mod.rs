// Correlation matrix
pub mod correlation;

// Domain-specific error types
pub mod errors;

// Forecast input/output shapes
pub mod forecast;

// Port interfaces
pub mod ports;

// Calendar profiles
pub mod seasonal;

// Time-indexed series
pub mod series;

// Aligned and feature tables
pub mod table;

// Untyped input tables
pub mod raw_table;
