//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Name the numeric shapes every fitting backend exchanges (parameter
//! vectors, gradients or score vectors, square Jacobians) and pin the
//! argmin L-BFGS instantiations used by the direct likelihood fit.
//!
//! Conventions
//! -----------
//! - All vectors and matrices are `ndarray` containers over `f64`.
//! - [`Hessian`] doubles as the Jacobian of a score system: for score
//!   equations `∇ℓ(θ) = 0` the Jacobian is the Hessian of `ℓ`.
//! - `Cost` is the scalar argmin minimizes, `c(θ) = −ℓ(θ)`.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient `∇ℓ(θ)`, `∇c(θ)`, or a score vector; same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense `n × n` matrix of second derivatives.
pub type Hessian = Array2<f64>;

/// Scalar objective value handed to argmin.
pub type Cost = f64;

/// Function-evaluation counters as reported by argmin (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size `m`.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
