//! root_finder — damped Newton solver for score equations.
//!
//! Purpose
//! -------
//! Solve `F(θ) = ∇ℓ(θ) = 0` for systems that supply their own Jacobian,
//! such as score equations compiled from a symbolic log-likelihood.
//!
//! Key behaviors
//! -------------
//! - Newton steps come from an LU solve of `J d = −F` (nalgebra); singular
//!   or non-ascent steps fall back to the score direction.
//! - Steps are halved until the trial point is in the domain, evaluates to
//!   finite values, and does not lower `ℓ`.
//! - Convergence is `‖F‖₂ ≤ tol_score · max(1, |ℓ|)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The start must be finite, of length [`ScoreEquations::dim`], and in
//!   the domain; violations are errors.
//! - Running out of iterations or acceptable steps is reported in
//!   [`RootOutcome::status`], never raised.
//!
//! Testing notes
//! -------------
//! - `newton` tests cover concave problems with and without domain
//!   boundaries, the ascent fallback on an indefinite Jacobian, and start
//!   validation.

pub mod newton;
pub mod traits;

pub use self::newton::solve_score_equations;
pub use self::traits::{RootOptions, RootOutcome, RootStatus, ScoreEquations, ScoreEval};
