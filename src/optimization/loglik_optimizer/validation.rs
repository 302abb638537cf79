//! Validation helpers shared by both fitting backends.
//!
//! - **Tolerance checks**: [`verify_tol_grad`], [`verify_tol_cost`],
//!   [`verify_tol_score`] accept `None` or a finite, strictly positive value.
//! - **Derivative checks**: [`validate_grad`] and [`validate_hessian`]
//!   enforce shape and finiteness of gradients, score vectors and Jacobians.
//! - **Estimates**: [`validate_theta_hat`] and [`validate_value`] gate what
//!   an optimizer may report as a result.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{Grad, Theta, types::Hessian},
};

/// # Errors
/// [`OptError::InvalidTolGrad`] if the value is non-finite or ≤ 0.
pub fn verify_tol_grad(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        positive_finite(tol).map_err(|reason| OptError::InvalidTolGrad { tol, reason })?;
    }
    Ok(())
}

/// # Errors
/// [`OptError::InvalidTolCost`] if the value is non-finite or ≤ 0.
pub fn verify_tol_cost(tol: Option<f64>) -> OptResult<()> {
    if let Some(tol) = tol {
        positive_finite(tol).map_err(|reason| OptError::InvalidTolCost { tol, reason })?;
    }
    Ok(())
}

/// Score-norm tolerance of the Newton root finder; unlike the L-BFGS
/// tolerances it is mandatory.
///
/// # Errors
/// [`OptError::InvalidTolScore`] if the value is non-finite or ≤ 0.
pub fn verify_tol_score(tol: f64) -> OptResult<()> {
    positive_finite(tol).map_err(|reason| OptError::InvalidTolScore { tol, reason })
}

fn positive_finite(tol: f64) -> Result<(), &'static str> {
    if !tol.is_finite() {
        return Err("Tolerance must be finite.");
    }
    if tol <= 0.0 {
        return Err("Tolerance must be positive.");
    }
    Ok(())
}

/// Validate a gradient (or score vector) against dimension and finiteness.
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if `grad.len() != dim`.
/// - [`OptError::InvalidGradient`] naming the first non-finite entry.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate and unwrap an estimated parameter vector.
///
/// # Errors
/// - [`OptError::MissingThetaHat`] if no vector was provided.
/// - [`OptError::InvalidThetaHat`] if any element is non-finite.
pub fn validate_theta_hat(theta_hat: Option<Theta>) -> OptResult<Theta> {
    let t = theta_hat.ok_or(OptError::MissingThetaHat)?;
    if let Some((index, &value)) = t.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(OptError::InvalidThetaHat {
            index,
            value,
            reason: "Parameter estimates must be finite.",
        });
    }
    Ok(t)
}

/// # Errors
/// [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

/// Validate a square second-derivative matrix.
///
/// # Errors
/// - [`OptError::HessianDimMismatch`] if the matrix is not `dim × dim`.
/// - [`OptError::InvalidHessian`] naming the first non-finite entry.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> OptResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(OptError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((i, j), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(OptError::InvalidHessian { row: i, col: j, value });
        }
    }
    Ok(())
}
