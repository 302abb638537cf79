//! models::hazard — discrete hazard laws of the supported SRGM variants.
//!
//! Purpose
//! -------
//! Define the closed set of model variants ([`ModelKind`]) and their
//! per-interval hazard `h(i; b)`: the probability that a remaining fault is
//! detected in interval `i`, given it survived the earlier intervals.
//!
//! Key behaviors
//! -------------
//! - Each hazard is written once, generically over [`Real`], and is used
//!   both to record the symbolic log-likelihood and to evaluate the fitted
//!   hazard sequence numerically.
//! - [`HazardModel`] is the capability interface shared by [`ModelKind`]
//!   and [`ModelSpec`](crate::models::ModelSpec).
//!
//! Invariants & assumptions
//! ------------------------
//! - Interval indices are 1-based: `i ≥ 1`.
//! - For every variant the shape parameter domain is the open interval
//!   `(0, 1)`; inside it each hazard lies in `[0, 1)`.
//!
//! | Code  | Hazard `h(i; b)`                 |
//! |-------|----------------------------------|
//! | GM    | `b`                              |
//! | NB2   | `i·b² / (1 + b·(i − 1))`         |
//! | DW2   | `1 − b^(i² − (i − 1)²)`          |
//! | DW3   | `1 − b^(i³ − (i − 1)³)`          |
//! | IFRSB | `1 − b / i`                      |
use std::{fmt, str::FromStr};

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::{
    estimation::errors::EstimationError,
    models::spec::{DEFAULT_COX_RANGE, GuessRanges, ParamRange},
    symbolic::Real,
};

/// Capability interface every model descriptor exposes to the engine.
pub trait HazardModel {
    /// Hazard at 1-based interval `i` for shape parameter `b`.
    fn hazard<T: Real>(&self, i: usize, b: T) -> T;
    fn initial_guess_range(&self) -> GuessRanges;
    fn supports_covariates(&self) -> bool;
    /// `false` routes the variant through direct likelihood maximization
    /// instead of the symbolic score-equation pipeline.
    fn supports_symbolic_fit(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModelKind {
    Geometric,
    NegativeBinomial2,
    DiscreteWeibull2,
    DiscreteWeibull3,
    IfrSalviaBollinger,
}

impl ModelKind {
    pub const ALL: [ModelKind; 5] = [
        ModelKind::Geometric,
        ModelKind::NegativeBinomial2,
        ModelKind::DiscreteWeibull2,
        ModelKind::DiscreteWeibull3,
        ModelKind::IfrSalviaBollinger,
    ];

    pub fn short_name(self) -> &'static str {
        match self {
            ModelKind::Geometric => "GM",
            ModelKind::NegativeBinomial2 => "NB2",
            ModelKind::DiscreteWeibull2 => "DW2",
            ModelKind::DiscreteWeibull3 => "DW3",
            ModelKind::IfrSalviaBollinger => "IFRSB",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Geometric => "Geometric",
            ModelKind::NegativeBinomial2 => "Negative Binomial (Order 2)",
            ModelKind::DiscreteWeibull2 => "Discrete Weibull (Order 2)",
            ModelKind::DiscreteWeibull3 => "Discrete Weibull (Order 3)",
            ModelKind::IfrSalviaBollinger => "IFR Salvia & Bollinger",
        }
    }

    /// Case-insensitive lookup by short code.
    pub fn from_short_name(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.short_name().eq_ignore_ascii_case(code.trim()))
    }

    /// Open domain of the shape parameter.
    pub fn shape_domain(self) -> (f64, f64) {
        (0.0, 1.0)
    }

    pub fn default_shape_range(self) -> ParamRange {
        match self {
            ModelKind::Geometric | ModelKind::NegativeBinomial2 => ParamRange::new(0.01, 0.1),
            ModelKind::DiscreteWeibull2 | ModelKind::DiscreteWeibull3 => {
                ParamRange::new(0.9, 0.9999)
            }
            ModelKind::IfrSalviaBollinger => ParamRange::new(0.1, 0.9),
        }
    }

    /// Hazard values for intervals `1..=n` at a numeric `b`.
    pub fn hazard_sequence(self, b: f64, n: usize) -> Array1<f64> {
        (1..=n).map(|i| self.hazard(i, b)).collect()
    }
}

impl HazardModel for ModelKind {
    fn hazard<T: Real>(&self, i: usize, b: T) -> T {
        let one = b.lift(1.0);
        let fi = i as f64;
        match self {
            ModelKind::Geometric => b,
            ModelKind::NegativeBinomial2 => {
                b.lift(fi) * b * b / (one + b * b.lift(fi - 1.0))
            }
            ModelKind::DiscreteWeibull2 => one - b.powf(fi * fi - (fi - 1.0) * (fi - 1.0)),
            ModelKind::DiscreteWeibull3 => {
                one - b.powf(fi.powi(3) - (fi - 1.0).powi(3))
            }
            ModelKind::IfrSalviaBollinger => one - b / b.lift(fi),
        }
    }

    fn initial_guess_range(&self) -> GuessRanges {
        GuessRanges { shape: self.default_shape_range(), cox: DEFAULT_COX_RANGE }
    }

    fn supports_covariates(&self) -> bool {
        true
    }

    fn supports_symbolic_fit(&self) -> bool {
        !matches!(self, ModelKind::DiscreteWeibull2)
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for ModelKind {
    type Err = EstimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_short_name(s).ok_or_else(|| EstimationError::UnknownModel { name: s.to_string() })
    }
}
