//! estimation::direct — likelihood maximization without symbolic
//! derivatives.
//!
//! Purpose
//! -------
//! Fit variants that opt out of the symbolic pipeline by maximizing the
//! numeric log-likelihood with the argmin L-BFGS backend.
//!
//! Key behaviors
//! -------------
//! - The optimizer works on `θ = [logit b, β_1..β_k]`, so every trial point
//!   maps to a shape parameter inside `(0, 1)`.
//! - The objective is `ℓ / max(N, 1)`; scaling by the failure total keeps
//!   gradient tolerances meaningful across datasets of different size.
//! - Gradients are finite-differenced by the optimizer adapter.
//! - The logit map flattens the objective near `b = 0` and `b = 1`, so the
//!   optimizer can stop on its gradient tolerance at a boundary. Each fit
//!   therefore reports the scaled shape score `(∂ℓ/∂b) / N` in model
//!   coordinates; callers accept an optimum only when it is below
//!   [`SHAPE_SCORE_TOL`].
//!
//! Conventions
//! -----------
//! - [`fit_direct`] takes and returns parameters in model coordinates
//!   `[b, β]`, and reports the unscaled log-likelihood.
use finitediff::FiniteDiff;
use log::debug;

use crate::{
    models::{LikelihoodData, ModelKind, log_likelihood},
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, LogLikelihood, MLEOptions, Theta, maximize},
        numerical_stability::{LOGIT_EPS, safe_logistic, safe_logit},
    },
};

/// Largest `|∂ℓ/∂b| / N` accepted at a direct optimum.
pub const SHAPE_SCORE_TOL: f64 = 1e-2;

/// Scaled log-likelihood of one variant in logit coordinates.
#[derive(Debug, Clone, Copy)]
pub struct DirectLikelihood {
    kind: ModelKind,
}

impl DirectLikelihood {
    pub fn new(kind: ModelKind) -> Self {
        Self { kind }
    }

    /// Map optimizer coordinates to `(b, betas)`.
    fn unpack(theta: &Theta) -> (f64, Vec<f64>) {
        let b = safe_logistic(theta[0]).clamp(LOGIT_EPS, 1.0 - LOGIT_EPS);
        (b, theta.iter().skip(1).copied().collect())
    }
}

impl LogLikelihood for DirectLikelihood {
    type Data = LikelihoodData;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost> {
        let (b, betas) = Self::unpack(theta);
        let ll = log_likelihood(self.kind, b, &betas, data)?;
        Ok(ll / data.total_failures().max(1.0))
    }

    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()> {
        if theta.len() != data.n_params() {
            return Err(OptError::ThetaLengthMismatch {
                expected: data.n_params(),
                actual: theta.len(),
            });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaInput { index, value });
        }
        Ok(())
    }
}

/// Result of a direct fit in model coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectFit {
    /// `[b, β_1..β_k]`.
    pub theta_hat: Theta,
    pub log_likelihood: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    /// `(∂ℓ/∂b) / max(N, 1)` at the estimate; NaN if it could not be
    /// evaluated.
    pub shape_score: f64,
}

/// Maximize the log-likelihood of `kind` from `start = [b, β]`.
///
/// # Errors
/// - [`OptError::InvalidInitialGuess`] when `b` is outside `(0, 1)`.
/// - Any validation, likelihood or backend error from [`maximize`].
pub fn fit_direct(
    kind: ModelKind, data: &LikelihoodData, start: &Theta, opts: &MLEOptions,
) -> OptResult<DirectFit> {
    let b0 = start.get(0).copied().unwrap_or(f64::NAN);
    if !(b0 > 0.0 && b0 < 1.0) {
        return Err(OptError::InvalidInitialGuess {
            reason: format!("shape parameter {b0} must lie in (0, 1)"),
        });
    }
    let mut theta0 = start.clone();
    theta0[0] = safe_logit(b0);

    let objective = DirectLikelihood::new(kind);
    let outcome = maximize(&objective, theta0, data, opts)?;
    let shape_score = shape_score(&objective, &outcome.theta_hat, data);
    debug!(
        "{kind}: L-BFGS stopped after {} iterations ({}), shape score {shape_score:.3e}",
        outcome.iterations, outcome.status
    );

    let (b, betas) = DirectLikelihood::unpack(&outcome.theta_hat);
    let log_likelihood = log_likelihood(kind, b, &betas, data)?;
    let mut theta_hat = outcome.theta_hat;
    theta_hat[0] = b;
    Ok(DirectFit {
        theta_hat,
        log_likelihood,
        converged: outcome.converged,
        status: outcome.status,
        iterations: outcome.iterations,
        shape_score,
    })
}

/// Scaled score in `b` at `theta`, via the chain rule through the logit:
/// `∂f/∂b = (∂f/∂logit b) / (b (1 − b))`.
fn shape_score(objective: &DirectLikelihood, theta: &Theta, data: &LikelihoodData) -> f64 {
    let (b, _) = DirectLikelihood::unpack(theta);
    let grad = theta.central_diff(&|t: &Theta| objective.value(t, data).unwrap_or(f64::NAN));
    grad[0] / (b * (1.0 - b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FailureDataSet;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Objective scaling and input checks, and an end-to-end direct fit of the
    // Geometric model whose maximizer is known in closed form.
    // -------------------------------------------------------------------------

    fn halving_data() -> LikelihoodData {
        let counts: Vec<f64> = (0..10).map(|k| 512.0 / 2f64.powi(k)).collect();
        let ds = FailureDataSet::from_counts((1..=10).map(f64::from).collect(), counts, vec![])
            .unwrap();
        LikelihoodData::new(&ds, &[]).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The objective is the log-likelihood divided by the failure total, in
    // logit coordinates.
    //
    // Given
    // -----
    // - Halving counts (N = 1023), GM, θ = [logit 0.3].
    //
    // Expect
    // ------
    // - value · N equals `log_likelihood(GM, 0.3)`; a wrong length and a NaN
    //   entry are rejected by `check`.
    fn objective_is_scaled_loglik_in_logit_space() {
        // Arrange
        let data = halving_data();
        let f = DirectLikelihood::new(ModelKind::Geometric);
        let theta = array![safe_logit(0.3)];

        // Act
        let scaled = f.value(&theta, &data).unwrap();

        // Assert
        let direct = log_likelihood(ModelKind::Geometric, 0.3, &[], &data).unwrap();
        assert_relative_eq!(scaled * 1023.0, direct, max_relative = 1e-10);
        assert!(matches!(
            f.check(&array![0.0, 0.0], &data),
            Err(OptError::ThetaLengthMismatch { expected: 1, actual: 2 })
        ));
        assert!(matches!(
            f.check(&array![f64::NAN], &data),
            Err(OptError::InvalidThetaInput { index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // A direct fit recovers the closed-form Geometric estimate.
    //
    // Given
    // -----
    // - Halving counts, whose Geometric maximizer is b = 0.5; start b = 0.055.
    //
    // Expect
    // ------
    // - Converged, b within 1e-4 of 0.5, and the reported log-likelihood is
    //   the unscaled value at the estimate.
    fn direct_fit_recovers_geometric_rate() {
        // Arrange
        let data = halving_data();
        let opts = MLEOptions::default();

        // Act
        let fit = fit_direct(ModelKind::Geometric, &data, &array![0.055], &opts).unwrap();

        // Assert
        assert!(fit.converged, "status: {}", fit.status);
        assert_relative_eq!(fit.theta_hat[0], 0.5, epsilon = 1e-4);
        let expected = log_likelihood(ModelKind::Geometric, fit.theta_hat[0], &[], &data).unwrap();
        assert_relative_eq!(fit.log_likelihood, expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // An interior optimum has a vanishing shape score, while a run that
    // drifts to the boundary keeps a large one.
    //
    // Given
    // -----
    // - Halving counts (interior DW2 optimum near b = 0.7816).
    // - Counts [10, 0, 0, 0, 0, 0]: every failure in the first interval, so
    //   DW2's likelihood increases all the way to b = 0.
    //
    // Expect
    // ------
    // - Interior: |score| < SHAPE_SCORE_TOL.
    // - Boundary: b below 1e-3 and |score| well above SHAPE_SCORE_TOL.
    fn shape_score_separates_interior_from_boundary() {
        // Arrange
        let interior = halving_data();
        let ds = FailureDataSet::from_counts(
            (1..=6).map(f64::from).collect(),
            vec![10.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            vec![],
        )
        .unwrap();
        let boundary = LikelihoodData::new(&ds, &[]).unwrap();
        let opts = MLEOptions::default();

        // Act
        let inside =
            fit_direct(ModelKind::DiscreteWeibull2, &interior, &array![0.95], &opts).unwrap();
        let edge =
            fit_direct(ModelKind::DiscreteWeibull2, &boundary, &array![0.95], &opts).unwrap();

        // Assert
        assert!(inside.shape_score.abs() < SHAPE_SCORE_TOL, "score {}", inside.shape_score);
        assert!(edge.theta_hat[0] < 1e-3, "b = {}", edge.theta_hat[0]);
        assert!(!(edge.shape_score.abs() < SHAPE_SCORE_TOL), "score {}", edge.shape_score);
    }

    #[test]
    // Purpose
    // -------
    // Starting shapes outside (0, 1) are rejected before optimizing.
    //
    // Given
    // -----
    // - Starts b = 0 and b = 1.2.
    //
    // Expect
    // ------
    // - `InvalidInitialGuess` for both.
    fn start_outside_domain_is_rejected() {
        // Arrange
        let data = halving_data();
        let opts = MLEOptions::default();

        // Act / Assert
        for b in [0.0, 1.2] {
            assert!(matches!(
                fit_direct(ModelKind::Geometric, &data, &array![b], &opts),
                Err(OptError::InvalidInitialGuess { .. })
            ));
        }
    }
}
