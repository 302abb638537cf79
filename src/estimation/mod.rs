//! estimation — fitting one model to one covariate selection.
//!
//! Purpose
//! -------
//! Connect the model layer to the numeric backends. For every job the
//! engine takes a single initial guess, solves for the maximum-likelihood
//! parameters, and assembles fitted curves and comparison metrics.
//!
//! Key behaviors
//! -------------
//! - Variants with `supports_symbolic_fit()` are differentiated
//!   symbolically and solved with damped Newton on the score equations
//!   ([`score_system`]).
//! - Other variants are fitted by L-BFGS on a logit-transformed shape
//!   parameter ([`direct`]).
//! - [`pipeline::estimate`] never fails; per-model errors become
//!   non-converged [`FitResult`]s.
//!
//! Invariants & assumptions
//! ------------------------
//! - Metrics exist only for converged fits.
//! - Jobs are independent and deterministic for a given [`EngineConfig`].
//!
//! Downstream usage
//! ----------------
//! - The [`runner`](crate::runner) fans [`pipeline::estimate`] out over a
//!   batch of (model, metric set) jobs.
pub mod direct;
pub mod errors;
pub mod fit;
pub mod init;
pub mod options;
pub mod pipeline;
pub mod score_system;

pub use self::errors::{ConfigError, EstimationError, EstimationResult};
pub use self::fit::{
    FailureKind, FitFailure, FitMetrics, FitParameters, FitResult, FittedCurves, ResultKey,
};
pub use self::options::{DirectSettings, EngineConfig, InitStrategy, RangeOverride};
pub use self::pipeline::{estimate, try_estimate};
