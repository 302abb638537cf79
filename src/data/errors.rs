//! Dataset construction and import errors.
//!
//! Every variant here is fatal for a whole estimation request: the runner
//! validates the dataset and the requested metric names before any model
//! is attempted.
use thiserror::Error;

pub type DataResult<T> = Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Failure data set has no intervals")]
    Empty,

    #[error("Column '{column}' has {found} values, expected {expected}")]
    LengthMismatch { column: String, expected: usize, found: usize },

    #[error("Column '{column}' has a non-finite value {value} at row {row}")]
    NonFinite { column: String, row: usize, value: f64 },

    #[error("Cumulative failures must be non-negative; row {row} has {value}")]
    NegativeCumulative { row: usize, value: f64 },

    #[error("Cumulative failures must be non-decreasing; row {row} drops from {previous} to {value}")]
    DecreasingCumulative { row: usize, previous: f64, value: f64 },

    #[error("Unknown covariate metric '{name}'")]
    UnknownMetric { name: String },

    #[error("Covariate metric '{name}' appears more than once")]
    DuplicateMetric { name: String },

    #[error("Required column '{name}' was not found in the input table")]
    MissingColumn { name: String },

    #[error("Could not parse '{raw}' as a number at row {row}, column '{column}'")]
    Parse { row: usize, column: String, raw: String },

    #[error("Failed to read CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
