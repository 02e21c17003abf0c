//! Error types for parameter validation, loading and report export

use thiserror::Error;

/// A parameter set the engine refuses to project
///
/// Raised before any period is simulated; a projection either completes or
/// returns one of these and no records at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("second schedule age {second_age} is before the plan start age {init_age}")]
    SecondAgeBeforeStart { second_age: u32, init_age: u32 },

    #[error("retirement age {retirement_age} must be after the plan start age {init_age}")]
    EmptyHorizon { retirement_age: u32, init_age: u32 },

    #[error("retirement age {retirement_age} exceeds the supported maximum of {max}")]
    HorizonTooLong { retirement_age: u32, max: u32 },

    #[error("unsupported compounding frequency: {0} periods per year (expected 4, 12 or 26)")]
    UnsupportedFrequency(u32),
}

/// Failure reading a parameter set or limit table from disk
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON parameters: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0} contains no rows")]
    Empty(String),

    #[error("invalid limit table: {0}")]
    InvalidTable(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure writing a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}
