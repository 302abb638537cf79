//! models — SRGM variants, covariate weighting and the log-likelihood.
//!
//! Purpose
//! -------
//! Describe *what* is fitted: the closed set of hazard laws
//! ([`ModelKind`]), the per-variant descriptor carrying initial-guess
//! ranges ([`ModelSpec`]), proportional-hazards covariate weighting, and the
//! profile log-likelihood those pieces combine into.
//!
//! Conventions
//! -----------
//! - Formulas are generic over [`Real`](crate::symbolic::Real); the same
//!   function feeds the symbolic pipeline and the numeric one.
//! - Parameter vectors are ordered `(b, β_1, …, β_k)`.
//!
//! Downstream usage
//! ----------------
//! - `estimation` compiles [`SymbolicLogLikelihood`] into score equations,
//!   or maximizes [`log_likelihood`] directly for variants that opt out of
//!   symbolic fitting, then assembles fitted curves from
//!   [`detection_terms`].
pub mod covariates;
pub mod hazard;
pub mod likelihood;
pub mod spec;

pub use self::hazard::{HazardModel, ModelKind};
pub use self::likelihood::{
    DetectionTerm, LikelihoodData, SymbolicLogLikelihood, detection_terms, log_likelihood,
};
pub use self::spec::{DEFAULT_COX_RANGE, GuessRanges, ModelSpec, ParamRange};
