//! Public surface of the score-equation root finder.
//!
//! - [`ScoreEquations`]: system `F(θ) = ∇ℓ(θ) = 0` with its Jacobian.
//! - [`RootOptions`]: stopping rules and the backtracking budget.
//! - [`RootOutcome`] / [`RootStatus`]: normalized result.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian, verify_tol_score},
    },
};

/// One evaluation of a score system.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEval {
    /// `ℓ(θ)`, used as the merit function when damping steps.
    pub log_likelihood: f64,
    /// `F(θ) = ∇ℓ(θ)`.
    pub score: Grad,
    /// `∂F/∂θ`, the Hessian of `ℓ`.
    pub jacobian: Hessian,
}

impl ScoreEval {
    /// # Errors
    /// Non-finite log-likelihood, score or Jacobian entries, or shapes that
    /// disagree with `dim`.
    pub fn validate(&self, dim: usize) -> OptResult<()> {
        if !self.log_likelihood.is_finite() {
            return Err(OptError::NonFiniteCost { value: self.log_likelihood });
        }
        validate_grad(&self.score, dim)?;
        validate_hessian(&self.jacobian, dim)
    }
}

/// System of score equations solved by [`solve_score_equations`].
///
/// `evaluate` may fail for points where the likelihood is undefined; the
/// solver treats such trial points as rejected steps, and only an error at
/// the starting point is propagated.
///
/// [`solve_score_equations`]: super::solve_score_equations
pub trait ScoreEquations {
    fn dim(&self) -> usize;
    fn evaluate(&self, theta: &Theta) -> OptResult<ScoreEval>;

    /// Whether `theta` lies in the open parameter domain.
    fn in_domain(&self, _theta: &Theta) -> bool {
        true
    }
}

/// Stopping rules for the damped Newton iteration.
///
/// - `tol_score`: converged once `‖F(θ)‖₂ ≤ tol_score · max(1, |ℓ(θ)|)`.
/// - `max_iter`: cap on Newton iterations.
/// - `max_backtracks`: step halvings tried before a step is given up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootOptions {
    pub tol_score: f64,
    pub max_iter: usize,
    pub max_backtracks: usize,
}

impl RootOptions {
    /// # Errors
    /// - [`OptError::InvalidTolScore`] for a non-finite or non-positive
    ///   tolerance.
    /// - [`OptError::InvalidMaxIter`] / [`OptError::InvalidMaxBacktracks`]
    ///   for zero budgets.
    pub fn new(tol_score: f64, max_iter: usize, max_backtracks: usize) -> OptResult<Self> {
        verify_tol_score(tol_score)?;
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        if max_backtracks == 0 {
            return Err(OptError::InvalidMaxBacktracks {
                max_backtracks,
                reason: "At least one backtracking step is required.",
            });
        }
        Ok(Self { tol_score, max_iter, max_backtracks })
    }
}

impl Default for RootOptions {
    fn default() -> Self {
        Self { tol_score: 1e-8, max_iter: 100, max_backtracks: 60 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStatus {
    Converged,
    MaxIterReached,
    /// No damped step improved the log-likelihood.
    StepRejected,
}

impl fmt::Display for RootStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RootStatus::Converged => "converged",
            RootStatus::MaxIterReached => "maximum iterations reached",
            RootStatus::StepRejected => "no acceptable step",
        })
    }
}

/// Last iterate of the root finder and how the iteration ended.
#[derive(Debug, Clone, PartialEq)]
pub struct RootOutcome {
    pub theta_hat: Theta,
    pub log_likelihood: f64,
    pub score_norm: f64,
    pub status: RootStatus,
    pub iterations: usize,
}

impl RootOutcome {
    pub fn converged(&self) -> bool {
        self.status == RootStatus::Converged
    }
}
