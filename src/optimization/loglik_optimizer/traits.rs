//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait a model implements to be fitted directly.
//! - [`MLEOptions`] and [`Tolerances`]: configuration for the optimizer.
//! - [`LineSearcher`]: choice of line search used by L-BFGS.
//! - [`OptimOutcome`]: normalized result returned by `maximize`.
//!
//! Convention: we *maximize* `ℓ(θ)` by minimizing `c(θ) = −ℓ(θ)`. An analytic
//! gradient, when provided, is `∇ℓ(θ)`; the adapter flips the sign.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Objective maximized by the direct fitting backend.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`. Invalid
///   points are reported as an `OptError`, never a panic.
/// - `check(&Theta, &Data) -> OptResult<()>`: reject an obviously invalid
///   starting point. Called once before optimization.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic `∇ℓ(θ)`. When left
///   unimplemented the adapter finite-differences the cost.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Line search used inside L-BFGS.
///
/// Parses case-insensitively from `"MoreThuente"` / `"HagerZhang"`; any other
/// name is [`OptError::InvalidLineSearch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineSearcher {
    MoreThuente,
    HagerZhang,
}

impl FromStr for LineSearcher {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "morethuente" => Ok(LineSearcher::MoreThuente),
            "hagerzhang" => Ok(LineSearcher::HagerZhang),
            _ => Err(OptError::InvalidLineSearch {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'MoreThuente' or 'HagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Default: `tol_grad = 1e-6`, `tol_cost = 1e-9`, `max_iter = 300`,
/// More–Thuente line search, L-BFGS memory [`DEFAULT_LBFGS_MEM`](super::DEFAULT_LBFGS_MEM).
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl MLEOptions {
    /// # Errors
    /// [`OptError::InvalidLBFGSMem`] if `lbfgs_mem == Some(0)`.
    pub fn new(
        tols: Tolerances, line_searcher: LineSearcher, lbfgs_mem: Option<usize>,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        Ok(Self { tols, line_searcher, lbfgs_mem })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-6), tol_cost: Some(1e-9), max_iter: Some(300) },
            line_searcher: LineSearcher::MoreThuente,
            lbfgs_mem: None,
        }
    }
}

/// Stopping rules for L-BFGS.
///
/// - `tol_grad`: stop when the cost-gradient norm falls below this value.
/// - `tol_cost`: stop when the change in cost falls below this value.
/// - `max_iter`: hard cap on iterations.
///
/// At least one of the three must be provided (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Canonical result returned by `maximize`.
///
/// - `value` is the best **log-likelihood** `ℓ(θ̂)`, not the cost.
/// - `converged` is `true` only when the solver met a gradient or cost
///   tolerance; running out of iterations, interrupts and timeouts count as
///   not converged.
/// - `fn_evals` follows argmin's counter names (`cost_count`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated [`OptimOutcome`] from raw solver state.
    ///
    /// # Errors
    /// - [`OptError::MissingThetaHat`] / [`OptError::InvalidThetaHat`] for an
    ///   absent or non-finite best parameter.
    /// - [`OptError::NonFiniteCost`] for a non-finite best value.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match &termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => (
                matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                ),
                format!("{reason:?}"),
            ),
        };
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self {
            theta_hat,
            value,
            converged,
            status,
            iterations: iterations as usize,
            fn_evals,
            grad_norm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Tolerance validation, line-search parsing, options construction, and
    // the mapping from argmin termination status to `converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `Tolerances::new` rejects empty and malformed configurations.
    //
    // Given
    // -----
    // - All-`None`, a negative gradient tolerance, a NaN cost tolerance and
    //   `max_iter = 0`.
    //
    // Expect
    // ------
    // - The matching `OptError` variant for each; a valid triple passes.
    fn tolerances_reject_malformed_inputs() {
        // Arrange / Act / Assert
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(Some(-1.0), None, None),
            Err(OptError::InvalidTolGrad { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, Some(f64::NAN), None),
            Err(OptError::InvalidTolCost { .. })
        ));
        assert!(matches!(
            Tolerances::new(None, None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
        assert!(Tolerances::new(Some(1e-6), Some(1e-9), Some(300)).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Line searchers parse case-insensitively and options reject zero memory.
    //
    // Given
    // -----
    // - The strings "hagerzhang", "MORETHUENTE" and "bisection"; an
    //   `lbfgs_mem` of zero.
    //
    // Expect
    // ------
    // - Two successful parses, one `InvalidLineSearch`, one `InvalidLBFGSMem`.
    fn line_searcher_parsing_and_memory_validation() {
        // Arrange
        let tols = MLEOptions::default().tols;

        // Act / Assert
        assert_eq!("hagerzhang".parse::<LineSearcher>().unwrap(), LineSearcher::HagerZhang);
        assert_eq!("MORETHUENTE".parse::<LineSearcher>().unwrap(), LineSearcher::MoreThuente);
        assert!(matches!(
            "bisection".parse::<LineSearcher>(),
            Err(OptError::InvalidLineSearch { .. })
        ));
        assert!(matches!(
            MLEOptions::new(tols, LineSearcher::MoreThuente, Some(0)),
            Err(OptError::InvalidLBFGSMem { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Only tolerance-based termination counts as convergence.
    //
    // Given
    // -----
    // - The same finite state terminated by `SolverConverged`, by
    //   `MaxItersReached`, and not terminated at all.
    //
    // Expect
    // ------
    // - `converged` is true, false, false respectively.
    fn only_tolerance_termination_is_converged() {
        // Arrange
        let theta = array![0.5, -0.1];
        let build = |status: TerminationStatus| {
            OptimOutcome::new(
                Some(theta.clone()),
                -3.0,
                status,
                12,
                FnEvalMap::new(),
                Some(array![1e-8, 0.0]),
            )
            .unwrap()
        };

        // Act
        let solved = build(TerminationStatus::Terminated(TerminationReason::SolverConverged));
        let capped = build(TerminationStatus::Terminated(TerminationReason::MaxItersReached));
        let running = build(TerminationStatus::NotTerminated);

        // Assert
        assert!(solved.converged);
        assert!(!capped.converged);
        assert!(!running.converged);
        assert_eq!(solved.iterations, 12);
        assert!(solved.grad_norm.unwrap() < 1e-7);
    }
}
