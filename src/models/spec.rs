//! models::spec — per-variant descriptors and initial-guess ranges.
//!
//! A [`ModelSpec`] pairs a [`ModelKind`] with the ranges its single initial
//! guess is drawn from. Specs are plain values: overriding a range builds a
//! new spec, and nothing validates a range until a fit is attempted, so a
//! malformed range fails only the model that carries it.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    estimation::errors::EstimationError,
    models::hazard::{HazardModel, ModelKind},
    symbolic::Real,
};

/// Closed interval `[lo, hi]` an initial guess is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub lo: f64,
    pub hi: f64,
}

impl ParamRange {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lo + self.hi)
    }

    /// Check the range is finite, ordered and, when `open_domain` is given,
    /// lies strictly inside it.
    pub fn check(&self, open_domain: Option<(f64, f64)>) -> Result<(), String> {
        if !self.lo.is_finite() || !self.hi.is_finite() {
            return Err(format!("range [{}, {}] must be finite", self.lo, self.hi));
        }
        if self.lo > self.hi {
            return Err(format!("range [{}, {}] has lower bound above upper bound", self.lo, self.hi));
        }
        if let Some((dlo, dhi)) = open_domain {
            if self.lo <= dlo || self.hi >= dhi {
                return Err(format!(
                    "range [{}, {}] must lie strictly inside ({dlo}, {dhi})",
                    self.lo, self.hi
                ));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ParamRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}

/// Shape and covariate-weight ranges of one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuessRanges {
    pub shape: ParamRange,
    pub cox: ParamRange,
}

/// Default covariate-weight range shared by every variant.
pub const DEFAULT_COX_RANGE: ParamRange = ParamRange::new(0.0001, 0.01);

/// Static descriptor of one model variant plus its guess ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub kind: ModelKind,
    pub shape_range: ParamRange,
    pub cox_range: ParamRange,
    pub covariates_enabled: bool,
}

impl ModelSpec {
    /// Spec with the variant's default ranges.
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            shape_range: kind.default_shape_range(),
            cox_range: DEFAULT_COX_RANGE,
            covariates_enabled: true,
        }
    }

    pub fn with_shape_range(mut self, range: ParamRange) -> Self {
        self.shape_range = range;
        self
    }

    pub fn with_cox_range(mut self, range: ParamRange) -> Self {
        self.cox_range = range;
        self
    }

    /// Restrict this spec to covariate-free fits.
    pub fn without_covariates(mut self) -> Self {
        self.covariates_enabled = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn short_name(&self) -> &'static str {
        self.kind.short_name()
    }

    /// Validate both ranges against the variant's parameter domain.
    ///
    /// # Errors
    /// [`EstimationError::InvalidModelSpec`] naming the offending range.
    pub fn validate(&self) -> Result<(), EstimationError> {
        let invalid = |reason: String| EstimationError::InvalidModelSpec {
            model: self.short_name().to_string(),
            reason,
        };
        self.shape_range
            .check(Some(self.kind.shape_domain()))
            .map_err(|r| invalid(format!("shape {r}")))?;
        self.cox_range.check(None).map_err(|r| invalid(format!("covariate weight {r}")))?;
        Ok(())
    }
}

impl From<ModelKind> for ModelSpec {
    fn from(kind: ModelKind) -> Self {
        Self::new(kind)
    }
}

impl HazardModel for ModelSpec {
    fn hazard<T: Real>(&self, i: usize, b: T) -> T {
        self.kind.hazard(i, b)
    }

    fn initial_guess_range(&self) -> GuessRanges {
        GuessRanges { shape: self.shape_range, cox: self.cox_range }
    }

    fn supports_covariates(&self) -> bool {
        self.covariates_enabled && self.kind.supports_covariates()
    }

    fn supports_symbolic_fit(&self) -> bool {
        self.kind.supports_symbolic_fit()
    }
}
