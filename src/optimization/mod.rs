//! optimization — fitting backends, numerical helpers, and their error surface.
//!
//! Purpose
//! -------
//! Provide the two numeric engines a model fit can run on, independent of
//! any particular model:
//!
//! - [`root_finder`]: damped Newton on score equations `∇ℓ(θ) = 0` with an
//!   explicit Jacobian;
//! - [`loglik_optimizer`]: argmin L-BFGS maximization of `ℓ(θ)` directly.
//!
//! Key behaviors
//! -------------
//! - Both engines take an unconstrained or domain-checked `θ` and return a
//!   normalized outcome with a binary convergence flag.
//! - [`numerical_stability`] maps bounded model parameters to optimizer
//!   coordinates and back.
//! - Configuration mistakes, numerical failures and backend errors are
//!   reported as [`errors::OptError`] through [`errors::OptResult`].
//!
//! Conventions
//! -----------
//! - User-facing values are log-likelihoods; argmin internally minimizes
//!   `c(θ) = −ℓ(θ)`.
//! - Vectors and matrices use the `ndarray` aliases in
//!   [`loglik_optimizer::types`].
//! - Nothing in this layer logs; the estimation layer reports progress.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;
pub mod root_finder;

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
    pub use super::root_finder::{RootOptions, RootOutcome, ScoreEquations, solve_score_equations};
}
