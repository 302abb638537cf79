//! Damped Newton iteration for score equations.
//!
//! Each iteration solves `J(θ) d = −F(θ)` by LU factorization. When the
//! system is singular, or `d` is not an ascent direction for `ℓ`
//! (`F·d ≤ 0`, which happens when `J` is not negative definite), the score
//! itself is used as the direction. Steps are halved until the trial point
//! is in the domain, evaluates cleanly, and does not lower `ℓ` beyond
//! rounding noise.
use argmin_math::ArgminL2Norm;
use nalgebra::{DMatrix, DVector};

use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
    root_finder::traits::{RootOptions, RootOutcome, RootStatus, ScoreEquations, ScoreEval},
};

/// Relative slack allowed when comparing log-likelihoods of successive
/// iterates.
const MERIT_SLACK: f64 = 1e-12;

/// Solve `F(θ) = 0` from `theta0`.
///
/// # Errors
/// - [`OptError::ThetaLengthMismatch`] / [`OptError::InvalidThetaInput`] for
///   a start of the wrong length or with non-finite entries.
/// - [`OptError::InvalidInitialGuess`] if `theta0` is outside the domain.
/// - Any error from evaluating or validating the system at `theta0`.
///
/// Non-convergence is not an error: the outcome carries
/// [`RootStatus::MaxIterReached`] or [`RootStatus::StepRejected`].
pub fn solve_score_equations<F: ScoreEquations>(
    f: &F, theta0: Theta, opts: &RootOptions,
) -> OptResult<RootOutcome> {
    let dim = f.dim();
    check_start(f, &theta0)?;
    let mut theta = theta0;
    let mut eval = f.evaluate(&theta)?;
    eval.validate(dim)?;

    for iteration in 0..opts.max_iter {
        if is_converged(&eval, opts) {
            return Ok(outcome(theta, &eval, RootStatus::Converged, iteration));
        }
        let direction = newton_direction(&eval.jacobian, &eval.score);
        match backtrack(f, &theta, &direction, &eval, opts.max_backtracks) {
            Some((next_theta, next_eval)) => {
                theta = next_theta;
                eval = next_eval;
            }
            None => return Ok(outcome(theta, &eval, RootStatus::StepRejected, iteration)),
        }
    }
    let status =
        if is_converged(&eval, opts) { RootStatus::Converged } else { RootStatus::MaxIterReached };
    Ok(outcome(theta, &eval, status, opts.max_iter))
}

fn check_start<F: ScoreEquations>(f: &F, theta0: &Theta) -> OptResult<()> {
    if theta0.len() != f.dim() {
        return Err(OptError::ThetaLengthMismatch { expected: f.dim(), actual: theta0.len() });
    }
    if let Some((index, &value)) = theta0.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidThetaInput { index, value });
    }
    if !f.in_domain(theta0) {
        return Err(OptError::InvalidInitialGuess { reason: format!("{theta0} is not admissible") });
    }
    Ok(())
}

fn is_converged(eval: &ScoreEval, opts: &RootOptions) -> bool {
    eval.score.l2_norm() <= opts.tol_score * eval.log_likelihood.abs().max(1.0)
}

fn outcome(theta: Theta, eval: &ScoreEval, status: RootStatus, iterations: usize) -> RootOutcome {
    RootOutcome {
        theta_hat: theta,
        log_likelihood: eval.log_likelihood,
        score_norm: eval.score.l2_norm(),
        status,
        iterations,
    }
}

/// Newton direction `−J⁻¹F`, or `F` when that is unavailable or not uphill.
fn newton_direction(jacobian: &Hessian, score: &Grad) -> Grad {
    let n = score.len();
    let mut jac_nalg = DMatrix::<f64>::zeros(n, n);
    fill_dmatrix(jacobian, &mut jac_nalg);
    let rhs = DVector::from_iterator(n, score.iter().map(|v| -v));
    match jac_nalg.lu().solve(&rhs) {
        Some(step) if step.iter().all(|v| v.is_finite()) => {
            let step = Grad::from_iter(step.iter().copied());
            if step.dot(score) > 0.0 { step } else { score.clone() }
        }
        _ => score.clone(),
    }
}

/// Copy an `ndarray` matrix into a preallocated `DMatrix`, column by column.
fn fill_dmatrix(src: &Hessian, dst: &mut DMatrix<f64>) {
    for j in 0..src.ncols() {
        for i in 0..src.nrows() {
            dst[(i, j)] = src[[i, j]];
        }
    }
}

/// Halve the step along `direction` until a trial point is accepted.
fn backtrack<F: ScoreEquations>(
    f: &F, theta: &Theta, direction: &Grad, current: &ScoreEval, max_backtracks: usize,
) -> Option<(Theta, ScoreEval)> {
    let floor = current.log_likelihood - MERIT_SLACK * current.log_likelihood.abs();
    let mut step = 1.0;
    for _ in 0..=max_backtracks {
        let trial = theta + &(direction * step);
        if f.in_domain(&trial) {
            if let Ok(eval) = f.evaluate(&trial) {
                if eval.validate(f.dim()).is_ok() && eval.log_likelihood >= floor {
                    return Some((trial, eval));
                }
            }
        }
        step *= 0.5;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Convergence on concave objectives, domain handling, the ascent
    // fallback for indefinite Jacobians, and start validation.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = a·ln θ − θ on θ > 0, maximized at θ = a.
    struct PoissonRate {
        a: f64,
    }

    impl ScoreEquations for PoissonRate {
        fn dim(&self) -> usize {
            1
        }

        fn evaluate(&self, theta: &Theta) -> OptResult<ScoreEval> {
            let t = theta[0];
            Ok(ScoreEval {
                log_likelihood: self.a * t.ln() - t,
                score: array![self.a / t - 1.0],
                jacobian: array![[-self.a / (t * t)]],
            })
        }

        fn in_domain(&self, theta: &Theta) -> bool {
            theta[0] > 0.0
        }
    }

    /// ℓ(x, y) = −(x − 1)² − (y + 2)² − 0.5·x·y.
    struct CoupledQuadratic;

    impl ScoreEquations for CoupledQuadratic {
        fn dim(&self) -> usize {
            2
        }

        fn evaluate(&self, theta: &Theta) -> OptResult<ScoreEval> {
            let (x, y) = (theta[0], theta[1]);
            Ok(ScoreEval {
                log_likelihood: -(x - 1.0).powi(2) - (y + 2.0).powi(2) - 0.5 * x * y,
                score: array![-2.0 * (x - 1.0) - 0.5 * y, -2.0 * (y + 2.0) - 0.5 * x],
                jacobian: array![[-2.0, -0.5], [-0.5, -2.0]],
            })
        }
    }

    /// ℓ(θ) = −(θ² − 1)², whose Jacobian is positive near θ = 0.
    struct DoubleWell;

    impl ScoreEquations for DoubleWell {
        fn dim(&self) -> usize {
            1
        }

        fn evaluate(&self, theta: &Theta) -> OptResult<ScoreEval> {
            let t = theta[0];
            Ok(ScoreEval {
                log_likelihood: -(t * t - 1.0).powi(2),
                score: array![-4.0 * t * (t * t - 1.0)],
                jacobian: array![[-(12.0 * t * t - 4.0)]],
            })
        }
    }

    #[test]
    // Purpose
    // -------
    // A concave 1-D problem with a domain boundary converges to its root.
    //
    // Given
    // -----
    // - a = 3, start θ = 0.5, default options.
    //
    // Expect
    // ------
    // - Converged, θ̂ = 3 to 1e-7, score norm below tolerance.
    fn converges_on_concave_problem_with_domain() {
        // Arrange
        let f = PoissonRate { a: 3.0 };

        // Act
        let out = solve_score_equations(&f, array![0.5], &RootOptions::default()).unwrap();

        // Assert
        assert!(out.converged(), "status: {}", out.status);
        assert_relative_eq!(out.theta_hat[0], 3.0, epsilon = 1e-7);
        assert!(out.score_norm <= 1e-8 * out.log_likelihood.abs().max(1.0));
    }

    #[test]
    // Purpose
    // -------
    // A quadratic with a constant negative-definite Jacobian is solved in a
    // single full Newton step.
    //
    // Given
    // -----
    // - Start (5, 5).
    //
    // Expect
    // ------
    // - The score vanishes at θ̂ (residual below 1e-10) after exactly one
    //   iteration.
    fn quadratic_is_solved_in_one_step() {
        // Arrange
        let f = CoupledQuadratic;

        // Act
        let out = solve_score_equations(&f, array![5.0, 5.0], &RootOptions::default()).unwrap();

        // Assert
        assert!(out.converged());
        assert_eq!(out.iterations, 1);
        let eval = f.evaluate(&out.theta_hat).unwrap();
        assert!(eval.score.l2_norm() < 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // An indefinite Jacobian falls back to an ascent direction rather than
    // heading for the local minimum.
    //
    // Given
    // -----
    // - Double well started at θ = 0.1, where ℓ'' > 0.
    //
    // Expect
    // ------
    // - Converges to the maximum at θ = 1, not the stationary point at 0.
    fn indefinite_jacobian_uses_ascent_fallback() {
        // Arrange
        let f = DoubleWell;

        // Act
        let out = solve_score_equations(&f, array![0.1], &RootOptions::default()).unwrap();

        // Assert
        assert!(out.converged(), "status: {}", out.status);
        assert_relative_eq!(out.theta_hat[0], 1.0, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Invalid starts are rejected before the first evaluation.
    //
    // Given
    // -----
    // - A negative start for the rate problem, a length-2 start, and a NaN.
    //
    // Expect
    // ------
    // - `InvalidInitialGuess`, `ThetaLengthMismatch`, `InvalidThetaInput`.
    fn invalid_starts_are_rejected() {
        // Arrange
        let f = PoissonRate { a: 3.0 };
        let opts = RootOptions::default();

        // Act / Assert
        assert!(matches!(
            solve_score_equations(&f, array![-1.0], &opts),
            Err(OptError::InvalidInitialGuess { .. })
        ));
        assert!(matches!(
            solve_score_equations(&f, array![1.0, 2.0], &opts),
            Err(OptError::ThetaLengthMismatch { .. })
        ));
        assert!(matches!(
            solve_score_equations(&f, array![f64::NAN], &opts),
            Err(OptError::InvalidThetaInput { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Exhausting the iteration budget is reported, not raised.
    //
    // Given
    // -----
    // - The rate problem from θ = 0.01 with `max_iter = 1`.
    //
    // Expect
    // ------
    // - `MaxIterReached`, `converged() == false`.
    fn iteration_budget_is_reported() {
        // Arrange
        let f = PoissonRate { a: 3.0 };
        let opts = RootOptions::new(1e-8, 1, 60).unwrap();

        // Act
        let out = solve_score_equations(&f, array![0.01], &opts).unwrap();

        // Assert
        assert_eq!(out.status, RootStatus::MaxIterReached);
        assert!(!out.converged());
    }
}
