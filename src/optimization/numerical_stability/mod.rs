//! numerical_stability — guarded transforms between optimizer and model space.
//!
//! Purpose
//! -------
//! Map the unconstrained coordinates an optimizer moves in onto the bounded
//! parameters a model is defined on, without overflow or precision loss in
//! the tails.
//!
//! Key behaviors
//! -------------
//! - `safe_logistic` / `safe_logit` carry a probability-valued shape
//!   parameter `b ∈ (0, 1)` to and from ℝ.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; callers validate shapes and domains.
//! - `safe_logit` clamps its argument by [`LOGIT_EPS`], so a boundary
//!   initial guess maps to a finite coordinate instead of ±∞.
//!
//! Downstream usage
//! ----------------
//! - The direct L-BFGS fit reparameterizes the shape parameter through
//!   `safe_logit` before optimization and maps the optimum back through
//!   `safe_logistic`.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] cover agreement with naïve
//!   formulas, tail saturation, and the inverse round-trip.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{LOGIT_EPS, safe_logistic, safe_logit};

pub mod prelude {
    pub use super::transformations::{LOGIT_EPS, safe_logistic, safe_logit};
}
