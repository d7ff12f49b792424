//! Error types for the usercast library.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for usercast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while loading, preparing or modelling a series.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Missing values detected when not allowed.
    #[error("missing values detected in data")]
    MissingValues,

    /// Frequency inference failed.
    #[error("could not infer frequency: {0}")]
    FrequencyInference(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),

    /// Source file does not exist.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(String),

    /// Malformed CSV input.
    #[error("csv error: {0}")]
    Csv(String),

    /// Requested column is not present in the source.
    #[error("column '{column}' does not exist; available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A date cell could not be parsed.
    #[error("could not parse date '{value}' at row {row}")]
    DateParse { row: usize, value: String },

    /// A fill strategy cannot resolve a gap at the edge of the series.
    #[error("{method} cannot fill the gap at position {position}")]
    UnresolvedGap { position: usize, method: String },

    /// Figure rendering failed.
    #[error("plot error: {0}")]
    Plot(String),

    /// A report could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}
