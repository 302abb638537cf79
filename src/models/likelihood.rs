//! models::likelihood — profile NHPP log-likelihood over failure counts.
//!
//! Purpose
//! -------
//! Build the omega-concentrated log-likelihood of a discrete SRGM for one
//! (model, covariate selection) pair, generically over [`Real`] so the same
//! code produces the symbolic expression that gets differentiated and the
//! numeric value used by the direct optimizer and the post-fit metrics.
//!
//! Key behaviors
//! -------------
//! - [`detection_terms`] walks the intervals once, producing for each
//!   interval the hazard `h_i`, the unconditional detection mass
//!   `q_i = p_i · S_{i−1}` and the survival `S_i`.
//! - [`log_likelihood`] combines them:
//!   `ℓ = −N + N·ln N − N·ln(Σ q_i) + Σ_{y_i>0} y_i·ln q_i − Σ ln(y_i!)`,
//!   which is the Poisson count likelihood with omega profiled out at
//!   `ω̂ = N / Σ q_i`.
//! - [`SymbolicLogLikelihood::build`] records the expression with the shape
//!   parameter as symbol 0 and covariate weights as symbols `1..=k`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Intervals with zero failures contribute only through survival.
//! - A dataset with no failures has no informative likelihood and is
//!   rejected with [`SymbolicError::DegenerateData`].
use std::cell::RefCell;

use ndarray::{Array1, Array2};
use statrs::function::gamma::ln_gamma;

use crate::{
    data::{DataResult, FailureDataSet},
    models::{
        covariates::{covariate_weight, detection_probability, survival_factor},
        hazard::{HazardModel, ModelKind},
    },
    symbolic::{ExprGraph, NodeId, Real, Sym, SymbolicError, SymbolicResult},
};

/// Owned, per-job view of the observations a likelihood is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodData {
    counts: Array1<f64>,
    cumulative: Array1<f64>,
    covariates: Array2<f64>,
    total_failures: f64,
    ln_factorial_sum: f64,
}

impl LikelihoodData {
    /// Select the `metrics` covariate columns of `dataset`.
    pub fn new(dataset: &FailureDataSet, metrics: &[String]) -> DataResult<Self> {
        let covariates = dataset.covariate_matrix(metrics)?;
        let counts = dataset.counts().clone();
        let ln_factorial_sum = counts.iter().map(|&y| ln_gamma(y + 1.0)).sum();
        Ok(Self {
            total_failures: counts.sum(),
            cumulative: dataset.cumulative().clone(),
            counts,
            covariates,
            ln_factorial_sum,
        })
    }

    pub fn n_intervals(&self) -> usize {
        self.counts.len()
    }

    pub fn num_covariates(&self) -> usize {
        self.covariates.ncols()
    }

    /// Shape parameter plus one weight per covariate.
    pub fn n_params(&self) -> usize {
        self.num_covariates() + 1
    }

    pub fn counts(&self) -> &Array1<f64> {
        &self.counts
    }

    pub fn cumulative(&self) -> &Array1<f64> {
        &self.cumulative
    }

    pub fn covariates(&self) -> &Array2<f64> {
        &self.covariates
    }

    pub fn total_failures(&self) -> f64 {
        self.total_failures
    }
}

/// Per-interval quantities shared by the likelihood and the fitted curves.
#[derive(Debug, Clone, Copy)]
pub struct DetectionTerm<T> {
    pub hazard: T,
    /// Unconditional probability that a fault is detected in this interval.
    pub detection: T,
    /// Probability that a fault is still undetected after this interval.
    pub survival: T,
}

pub fn detection_terms<T: Real>(
    kind: ModelKind, b: T, betas: &[T], data: &LikelihoodData,
) -> SymbolicResult<Vec<DetectionTerm<T>>> {
    if betas.len() != data.num_covariates() {
        return Err(SymbolicError::ArityMismatch {
            expected: data.num_covariates(),
            found: betas.len(),
        });
    }
    let mut survival = b.lift(1.0);
    let mut terms = Vec::with_capacity(data.n_intervals());
    for idx in 0..data.n_intervals() {
        let hazard = kind.hazard(idx + 1, b);
        let weight = covariate_weight(betas, data.covariates.row(idx));
        let detection = detection_probability(hazard, weight) * survival;
        survival = survival * survival_factor(hazard, weight);
        terms.push(DetectionTerm { hazard, detection, survival });
    }
    Ok(terms)
}

/// Profile log-likelihood at `(b, betas)`.
///
/// # Errors
/// - [`SymbolicError::DegenerateData`] if no failures were observed.
/// - [`SymbolicError::ArityMismatch`] if `betas` does not match the
///   covariate count.
pub fn log_likelihood<T: Real>(
    kind: ModelKind, b: T, betas: &[T], data: &LikelihoodData,
) -> SymbolicResult<T> {
    let n_total = data.total_failures;
    if n_total <= 0.0 {
        return Err(SymbolicError::DegenerateData {
            reason: "the data set contains no observed failures".to_string(),
        });
    }
    let terms = detection_terms(kind, b, betas, data)?;

    let mut mass = b.lift(0.0);
    let mut observed = b.lift(0.0);
    for (term, &y) in terms.iter().zip(data.counts.iter()) {
        mass = mass + term.detection;
        if y > 0.0 {
            observed = observed + b.lift(y) * term.detection.ln();
        }
    }
    let constant = -n_total + n_total * n_total.ln() - data.ln_factorial_sum;
    Ok(b.lift(constant) - b.lift(n_total) * mass.ln() + observed)
}

/// Log-likelihood recorded as an expression graph over `(b, β_1..β_k)`.
#[derive(Debug, Clone)]
pub struct SymbolicLogLikelihood {
    pub graph: ExprGraph,
    pub root: NodeId,
}

impl SymbolicLogLikelihood {
    pub fn build(kind: ModelKind, data: &LikelihoodData) -> SymbolicResult<Self> {
        let graph = RefCell::new(ExprGraph::new(data.n_params()));
        let root = {
            let symbols = Sym::symbols(&graph);
            log_likelihood(kind, symbols[0], &symbols[1..], data)?.id()
        };
        Ok(Self { graph: graph.into_inner(), root })
    }

    pub fn n_params(&self) -> usize {
        self.graph.n_vars()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::Tape;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Closed-form checks of the profile likelihood, agreement between the
    // symbolic and numeric paths, and the degenerate zero-failure case.
    // -------------------------------------------------------------------------

    fn data(cumulative: Vec<f64>, covariates: Vec<(String, Vec<f64>)>) -> LikelihoodData {
        let n = cumulative.len();
        let names: Vec<String> = covariates.iter().map(|(name, _)| name.clone()).collect();
        let time = (1..=n).map(|i| i as f64).collect();
        let ds = FailureDataSet::new(time, cumulative, covariates).unwrap();
        LikelihoodData::new(&ds, &names).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // The geometric likelihood matches its hand-derived closed form.
    //
    // Given
    // -----
    // - Counts [4, 2, 1], b = 0.5 (q = [0.5, 0.25, 0.125], Σq = 0.875).
    //
    // Expect
    // ------
    // - ℓ = −7 + 7 ln 7 − 7 ln 0.875 + Σ y ln q − ln(4! 2! 1!).
    fn geometric_likelihood_matches_closed_form() {
        // Arrange
        let d = data(vec![4.0, 6.0, 7.0], vec![]);

        // Act
        let ll = log_likelihood(ModelKind::Geometric, 0.5, &[], &d).unwrap();

        // Assert
        let expected = -7.0 + 7.0 * 7f64.ln() - 7.0 * 0.875f64.ln()
            + 4.0 * 0.5f64.ln()
            + 2.0 * 0.25f64.ln()
            + 0.125f64.ln()
            - (24.0f64 * 2.0).ln();
        assert_relative_eq!(ll, expected, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Detection masses telescope: Σ q_i = 1 − S_n, with covariates present.
    //
    // Given
    // -----
    // - NB2 at b = 0.3 with one covariate and β = 0.05.
    //
    // Expect
    // ------
    // - Σ q_i equals 1 − survival after the last interval.
    fn detection_mass_telescopes() {
        // Arrange
        let d = data(vec![3.0, 7.0, 10.0, 14.0], vec![("E".into(), vec![4.0, 6.0, 5.0, 8.0])]);

        // Act
        let terms = detection_terms(ModelKind::NegativeBinomial2, 0.3, &[0.05], &d).unwrap();

        // Assert
        let mass: f64 = terms.iter().map(|t| t.detection).sum();
        assert_relative_eq!(mass, 1.0 - terms[3].survival, epsilon = 1e-14);
    }

    #[test]
    // Purpose
    // -------
    // The recorded expression evaluates to the numeric likelihood.
    //
    // Given
    // -----
    // - IFRSB with two covariates at (b, β1, β2) = (0.6, 0.01, 0.02).
    //
    // Expect
    // ------
    // - Compiled symbolic value equals the `f64` evaluation.
    fn symbolic_expression_matches_numeric_value() {
        // Arrange
        let d = data(
            vec![3.0, 7.0, 10.0, 14.0, 17.0],
            vec![
                ("E".into(), vec![4.0, 6.0, 5.0, 8.0, 6.5]),
                ("F".into(), vec![1.0, 2.0, 1.0, 3.0, 2.0]),
            ],
        );
        let point = [0.6, 0.01, 0.02];

        // Act
        let sym = SymbolicLogLikelihood::build(ModelKind::IfrSalviaBollinger, &d).unwrap();
        let tape = Tape::compile(&sym.graph, &[sym.root]);
        let symbolic = tape.evaluate(&point).unwrap()[0];
        let numeric =
            log_likelihood(ModelKind::IfrSalviaBollinger, point[0], &point[1..], &d).unwrap();

        // Assert
        assert_eq!(sym.n_params(), 3);
        assert_relative_eq!(symbolic, numeric, epsilon = 1e-10);
    }

    #[test]
    // Purpose
    // -------
    // Zero observed failures cannot form a likelihood.
    //
    // Given
    // -----
    // - A five-interval dataset whose cumulative column is all zeros.
    //
    // Expect
    // ------
    // - Both numeric and symbolic construction return `DegenerateData`.
    fn zero_failures_are_degenerate() {
        // Arrange
        let d = data(vec![0.0; 5], vec![]);

        // Act
        let numeric = log_likelihood(ModelKind::Geometric, 0.5, &[], &d);
        let symbolic = SymbolicLogLikelihood::build(ModelKind::Geometric, &d);

        // Assert
        assert!(matches!(numeric, Err(SymbolicError::DegenerateData { .. })));
        assert!(matches!(symbolic, Err(SymbolicError::DegenerateData { .. })));
    }
}
