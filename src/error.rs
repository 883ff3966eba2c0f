//! Error types for trendgate

use thiserror::Error;

/// Caller-contract violations raised by the decision engine.
///
/// Neither kind is retried internally; both mean the caller must supply more
/// data before calling again. Every other computation path is total.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("Cannot compute a baseline from an empty dataset")]
    EmptyDataset,

    #[error("A decision requires at least 2 daily records, got {got}")]
    InsufficientHistory { got: usize },
}

/// Errors raised while ingesting records at the acquisition boundary
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to parse record at line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("Invalid {field} reading on {date}: {value}")]
    InvalidReading {
        field: &'static str,
        date: chrono::NaiveDate,
        value: f64,
    },
}
