//! Errors raised while building, differentiating or evaluating expressions.
use thiserror::Error;

pub type SymbolicResult<T> = Result<T, SymbolicError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolicError {
    /// The data cannot support a log-likelihood (e.g. zero observed failures).
    #[error("Degenerate data for log-likelihood construction: {reason}")]
    DegenerateData { reason: String },

    #[error("Expected {expected} parameter values, found {found}")]
    ArityMismatch { expected: usize, found: usize },

    #[error("Variable index {index} out of range for {n_vars} free symbols")]
    UnknownVariable { index: usize, n_vars: usize },

    #[error("Compiled expression output {output} evaluated to a non-finite value: {value}")]
    NonFiniteEvaluation { output: usize, value: f64 },
}
