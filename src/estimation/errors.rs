//! estimation::errors — failures of a single model fit and of engine
//! configuration.
//!
//! Every variant of [`EstimationError`] except [`EstimationError::Data`] is a
//! per-model failure: it ends that model's fit as non-converged and never
//! aborts a batch. Data errors are raised before any model runs.
use thiserror::Error;

use crate::{data::DataError, optimization::errors::OptError, symbolic::SymbolicError};

pub type EstimationResult<T> = Result<T, EstimationError>;

#[derive(Debug, Error)]
pub enum EstimationError {
    #[error("Invalid data set: {0}")]
    Data(#[from] DataError),

    #[error("Could not construct the log-likelihood: {0}")]
    SymbolicConstruction(#[from] SymbolicError),

    /// The solver returned parameters outside the model's domain.
    #[error("Model {model}: estimate {parameter} = {value} lies outside the parameter domain")]
    NumericDomain { model: String, parameter: &'static str, value: f64 },

    #[error("Model {model} did not converge after {iterations} iterations ({status})")]
    NonConvergence { model: String, iterations: usize, status: String },

    #[error("Solver failure: {0}")]
    Optimization(#[from] OptError),

    #[error("Model {model} is misconfigured: {reason}")]
    InvalidModelSpec { model: String, reason: String },

    #[error("Model {model} does not accept covariates")]
    UnsupportedCovariates { model: String },

    #[error("Unknown model code '{name}'")]
    UnknownModel { name: String },
}

/// Errors loading or validating an [`EngineConfig`](super::EngineConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid solver settings: {0}")]
    Invalid(#[from] OptError),

    #[error("Invalid range override: {0}")]
    Range(#[from] EstimationError),
}
