//! loglik_optimizer — argmin-powered log-likelihood maximizer.
//!
//! Purpose
//! -------
//! Maximize a log-likelihood `ℓ(θ)` over an unconstrained parameter vector
//! with L-BFGS. This is the direct fitting backend, used for model variants
//! whose likelihood is not turned into symbolic score equations.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] presents `c(θ) = −ℓ(θ)` to argmin and
//!   finite-differences the cost when no analytic gradient exists.
//! - [`maximize`] validates the start, builds the solver for the chosen
//!   line search ([`builders`]), runs it ([`run::run_lbfgs`]) and returns an
//!   [`OptimOutcome`].
//! - [`validation`] holds the shape and finiteness checks shared with the
//!   Newton root finder.
//!
//! Invariants & assumptions
//! ------------------------
//! - Implementations of [`LogLikelihood`] report invalid points as
//!   [`OptError`](crate::optimization::errors::OptError), never panics.
//! - `OptimOutcome::converged` is `true` only for tolerance-based
//!   termination; an exhausted iteration budget is reported, not raised.
//!
//! Conventions
//! -----------
//! - Gradients from [`LogLikelihood::grad`] are `∇ℓ`; the adapter negates.
//! - User-facing values (including [`OptimOutcome::value`]) are
//!   log-likelihoods, not costs.
//!
//! Testing notes
//! -------------
//! - Unit tests cover sign conventions and the FD fallback ([`adapter`]),
//!   solver construction ([`builders`]), validators ([`validation`]),
//!   termination mapping ([`traits`]) and end-to-end solves ([`api`]).

pub mod adapter;
pub mod api;
pub mod builders;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Hessian, Theta};

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, Tolerances};
    pub use super::types::{Cost, Grad, Theta};
}
