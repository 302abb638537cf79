//! estimation::fit — fitted models, their curves and comparison metrics.
//!
//! Purpose
//! -------
//! Turn a converged `(b, β)` into everything a consumer reads off a fit:
//! expected total faults `ω`, the mean value function, the failure
//! intensity, and LLF / AIC / BIC / SSE. Non-converged fits keep their key
//! and time axis but carry a typed [`FitFailure`] instead of metrics.
//!
//! Key behaviors
//! -------------
//! - `ω = N / Σ q_i`, `mvf_i = ω (1 − S_i)`, `intensity_i = ω q_i`, with
//!   `q_i` and `S_i` from [`detection_terms`].
//! - `AIC = −2 LLF + 2k` and `BIC = −2 LLF + k ln n`, `k = #covariates + 1`.
//! - `SSE = Σ (mvf_i − cumulative_i)²`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A [`FitResult`] has curves and metrics if and only if it is converged;
//!   every accessor for them returns `None` otherwise.
//! - Assembly rejects non-finite curves or metrics as
//!   [`EstimationError::NumericDomain`], so a converged result never holds
//!   NaN or infinity.
use std::fmt;

use ndarray::Array1;

use crate::{
    estimation::errors::{EstimationError, EstimationResult},
    models::{LikelihoodData, ModelKind, detection_terms},
    symbolic::SymbolicError,
};

/// Identity of one job: model short code plus covariate selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultKey {
    pub model: String,
    pub metrics: Vec<String>,
}

impl ResultKey {
    pub fn new(model: impl Into<String>, metrics: &[String]) -> Self {
        Self { model: model.into(), metrics: metrics.to_vec() }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.metrics.is_empty() {
            write!(f, "{}", self.model)
        } else {
            write!(f, "{} ({})", self.model, self.metrics.join(", "))
        }
    }
}

/// Estimated shape parameter and covariate weights.
#[derive(Debug, Clone, PartialEq)]
pub struct FitParameters {
    pub b: f64,
    pub betas: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurves {
    pub omega: f64,
    pub hazard: Vec<f64>,
    pub mvf_list: Vec<f64>,
    pub intensity_list: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitMetrics {
    pub llf: f64,
    pub aic: f64,
    pub bic: f64,
    pub sse: f64,
}

/// Category of a per-model failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SymbolicConstruction,
    NumericDomain,
    NonConvergence,
    Optimization,
    InvalidModelSpec,
    UnsupportedCovariates,
    Data,
    /// The job panicked; the runner caught it.
    Panic,
}

/// Why a fit has no metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FitFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl FitFailure {
    pub fn panic(message: impl Into<String>) -> Self {
        Self { kind: FailureKind::Panic, message: message.into() }
    }
}

impl From<&EstimationError> for FitFailure {
    fn from(err: &EstimationError) -> Self {
        let kind = match err {
            EstimationError::Data(_) => FailureKind::Data,
            EstimationError::SymbolicConstruction(_) => FailureKind::SymbolicConstruction,
            EstimationError::NumericDomain { .. } => FailureKind::NumericDomain,
            EstimationError::NonConvergence { .. } => FailureKind::NonConvergence,
            EstimationError::Optimization(_) => FailureKind::Optimization,
            EstimationError::InvalidModelSpec { .. } | EstimationError::UnknownModel { .. } => {
                FailureKind::InvalidModelSpec
            }
            EstimationError::UnsupportedCovariates { .. } => FailureKind::UnsupportedCovariates,
        };
        Self { kind, message: err.to_string() }
    }
}

impl fmt::Display for FitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Outcome of fitting one model to one covariate selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub key: ResultKey,
    /// Full model name, e.g. "Geometric".
    pub name: String,
    pub converged: bool,
    /// Time axis of the dataset.
    pub t: Vec<f64>,
    parameters: Option<FitParameters>,
    curves: Option<FittedCurves>,
    metrics: Option<FitMetrics>,
    failure: Option<FitFailure>,
    iterations: usize,
}

impl FitResult {
    /// Converged result; computes curves and metrics at `(b, betas)`.
    ///
    /// # Errors
    /// - [`EstimationError::SymbolicConstruction`] if the likelihood cannot
    ///   be evaluated (e.g. no failures).
    /// - [`EstimationError::NumericDomain`] if `b ∉ (0, 1)` or any curve or
    ///   metric is non-finite.
    pub fn assemble(
        kind: ModelKind, key: ResultKey, t: Vec<f64>, parameters: FitParameters, llf: f64,
        data: &LikelihoodData, iterations: usize,
    ) -> EstimationResult<Self> {
        let model = kind.short_name().to_string();
        let domain_error = |parameter: &'static str, value: f64| EstimationError::NumericDomain {
            model: model.clone(),
            parameter,
            value,
        };
        let (lo, hi) = kind.shape_domain();
        if !(parameters.b > lo && parameters.b < hi) {
            return Err(domain_error("b", parameters.b));
        }
        if !llf.is_finite() {
            return Err(domain_error("log-likelihood", llf));
        }

        let curves = fitted_curves(kind, &parameters, data)?;
        if !curves.omega.is_finite() || curves.omega <= 0.0 {
            return Err(domain_error("omega", curves.omega));
        }
        let mut values = curves.mvf_list.iter().chain(&curves.intensity_list);
        if let Some(&bad) = values.find(|v| !v.is_finite()) {
            return Err(domain_error("fitted curve", bad));
        }

        let metrics = information_criteria(llf, data, &curves.mvf_list);
        if !metrics.sse.is_finite() {
            return Err(domain_error("SSE", metrics.sse));
        }

        Ok(Self {
            key,
            name: kind.name().to_string(),
            converged: true,
            t,
            parameters: Some(parameters),
            curves: Some(curves),
            metrics: Some(metrics),
            failure: None,
            iterations,
        })
    }

    /// Non-converged result carrying `failure`.
    pub fn failed(key: ResultKey, name: impl Into<String>, t: Vec<f64>, failure: FitFailure) -> Self {
        Self {
            key,
            name: name.into(),
            converged: false,
            t,
            parameters: None,
            curves: None,
            metrics: None,
            failure: Some(failure),
            iterations: 0,
        }
    }

    /// Estimates; `None` when not converged.
    pub fn parameters(&self) -> Option<&FitParameters> {
        self.parameters.as_ref()
    }

    pub fn curves(&self) -> Option<&FittedCurves> {
        self.curves.as_ref()
    }

    pub fn metrics(&self) -> Option<&FitMetrics> {
        self.metrics.as_ref()
    }

    pub fn failure(&self) -> Option<&FitFailure> {
        self.failure.as_ref()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn omega(&self) -> Option<f64> {
        self.curves.as_ref().map(|c| c.omega)
    }

    pub fn mvf_list(&self) -> Option<&[f64]> {
        self.curves.as_ref().map(|c| c.mvf_list.as_slice())
    }

    pub fn intensity_list(&self) -> Option<&[f64]> {
        self.curves.as_ref().map(|c| c.intensity_list.as_slice())
    }

    pub fn hazard_list(&self) -> Option<&[f64]> {
        self.curves.as_ref().map(|c| c.hazard.as_slice())
    }

    pub fn llf_val(&self) -> Option<f64> {
        self.metrics.map(|m| m.llf)
    }

    pub fn aic_val(&self) -> Option<f64> {
        self.metrics.map(|m| m.aic)
    }

    pub fn bic_val(&self) -> Option<f64> {
        self.metrics.map(|m| m.bic)
    }

    pub fn sse_val(&self) -> Option<f64> {
        self.metrics.map(|m| m.sse)
    }
}

/// Hazard, `ω`, MVF and intensity at the given parameters.
///
/// # Errors
/// [`EstimationError::SymbolicConstruction`] for zero failures or a
/// covariate-count mismatch.
pub fn fitted_curves(
    kind: ModelKind, parameters: &FitParameters, data: &LikelihoodData,
) -> EstimationResult<FittedCurves> {
    let n_total = data.total_failures();
    if n_total <= 0.0 {
        return Err(SymbolicError::DegenerateData {
            reason: "the data set contains no observed failures".to_string(),
        }
        .into());
    }
    let terms = detection_terms(kind, parameters.b, &parameters.betas, data)?;
    let mass: f64 = terms.iter().map(|t| t.detection).sum();
    let omega = n_total / mass;
    Ok(FittedCurves {
        omega,
        hazard: terms.iter().map(|t| t.hazard).collect(),
        mvf_list: terms.iter().map(|t| omega * (1.0 - t.survival)).collect(),
        intensity_list: terms.iter().map(|t| omega * t.detection).collect(),
    })
}

/// LLF, AIC, BIC and SSE of a fit with `data.n_params()` parameters.
pub fn information_criteria(llf: f64, data: &LikelihoodData, mvf: &[f64]) -> FitMetrics {
    let k = data.n_params() as f64;
    let n = data.n_intervals() as f64;
    let residuals = Array1::from(mvf.to_vec()) - data.cumulative();
    FitMetrics {
        llf,
        aic: -2.0 * llf + 2.0 * k,
        bic: -2.0 * llf + k * n.ln(),
        sse: residuals.mapv(|r| r * r).sum(),
    }
}
