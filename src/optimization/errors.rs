//! optimization::errors — unified error surface for both fitting backends.
//!
//! Purpose
//! -------
//! Collect configuration mistakes, numerical failures and backend solver
//! errors from the L-BFGS optimizer and the Newton root finder into a single
//! enum, [`OptError`], with the result alias [`OptResult<T>`].
//!
//! Conventions
//! -----------
//! - Argmin errors are converted through `From<argmin::core::Error>` so that
//!   no `argmin::core::Error` crosses a module boundary.
//! - Likelihood evaluation failures raised by the model layer are carried as
//!   [`OptError::Likelihood`] with the rendered message.
use argmin::core::{ArgminError, Error};
use thiserror::Error;

use crate::symbolic::SymbolicError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that FD should be used
    #[error("Gradient optimization not implemented")]
    GradientNotImplemented,

    #[error("Gradient dimension mismatch: expected {expected}, found {found}")]
    GradientDimMismatch { expected: usize, found: usize },

    #[error("Invalid gradient at index {index}: {value}: {reason}")]
    InvalidGradient { index: usize, value: f64, reason: &'static str },

    // ---- Options ----
    #[error("Invalid gradient tolerance {tol}: {reason}")]
    InvalidTolGrad { tol: f64, reason: &'static str },

    #[error("Invalid cost function change tolerance {tol}: {reason}")]
    InvalidTolCost { tol: f64, reason: &'static str },

    #[error("Invalid score tolerance {tol}: {reason}")]
    InvalidTolScore { tol: f64, reason: &'static str },

    #[error("Invalid maximum iterations {max_iter}: {reason}")]
    InvalidMaxIter { max_iter: usize, reason: &'static str },

    #[error("Invalid maximum backtracking steps {max_backtracks}: {reason}")]
    InvalidMaxBacktracks { max_backtracks: usize, reason: &'static str },

    #[error("No tolerances provided")]
    NoTolerancesProvided,

    #[error("Invalid line searcher '{name}': {reason}")]
    InvalidLineSearch { name: String, reason: &'static str },

    #[error("Invalid L-BFGS memory {mem}: {reason}")]
    InvalidLBFGSMem { mem: usize, reason: &'static str },

    // ---- Objective ----
    #[error("Non-finite cost value: {value}")]
    NonFiniteCost { value: f64 },

    #[error("Log-likelihood evaluation failed: {text}")]
    Likelihood { text: String },

    // ---- Parameters ----
    #[error("Theta length mismatch: expected {expected}, actual {actual}")]
    ThetaLengthMismatch { expected: usize, actual: usize },

    #[error("Invalid theta input at index {index}: {value}, must be finite")]
    InvalidThetaInput { index: usize, value: f64 },

    #[error("Initial guess lies outside the parameter domain: {reason}")]
    InvalidInitialGuess { reason: String },

    // ---- Optimizer outcome ----
    #[error("Invalid estimated parameter at index {index}: {value}: {reason}")]
    InvalidThetaHat { index: usize, value: f64, reason: &'static str },

    #[error("Missing estimated parameters (theta hat)")]
    MissingThetaHat,

    // ---- Second-order information ----
    #[error("Jacobian dimension mismatch: expected ({expected}, {expected}), found {found:?}")]
    HessianDimMismatch { expected: usize, found: (usize, usize) },

    #[error("Invalid Jacobian at ({row}, {col}): {value}, must be finite")]
    InvalidHessian { row: usize, col: usize, value: f64 },

    // ---- Argmin ----
    #[error("Invalid parameter: {text}")]
    InvalidParameter { text: String },
    #[error("Not implemented: {text}")]
    NotImplemented { text: String },
    #[error("Not initialized: {text}")]
    NotInitialized { text: String },
    #[error("Condition violated: {text}")]
    ConditionViolated { text: String },
    #[error("Checkpoint not found: {text}")]
    CheckPointNotFound { text: String },
    #[error("Potential bug: {text}")]
    PotentialBug { text: String },
    #[error("Impossible error: {text}")]
    ImpossibleError { text: String },
    #[error("Backend error: {text}")]
    BackendError { text: String },

    // ---- Fallback ----
    #[error("Unknown error")]
    UnknownError,
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        // Errors we raised ourselves inside argmin callbacks come back intact.
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<SymbolicError> for OptError {
    fn from(err: SymbolicError) -> Self {
        OptError::Likelihood { text: err.to_string() }
    }
}
