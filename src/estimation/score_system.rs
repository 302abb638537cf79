//! estimation::score_system — compiled score equations of one job.
//!
//! Purpose
//! -------
//! Differentiate the symbolic log-likelihood of a (model, metric set) pair
//! once, then expose `ℓ`, the score vector and its Jacobian as a single
//! compiled [`Tape`] the Newton root finder can evaluate repeatedly.
//!
//! Key behaviors
//! -------------
//! - Tape outputs are laid out as `[ℓ, ∂ℓ/∂θ_0..∂ℓ/∂θ_{d−1}, upper(J)]`,
//!   where `upper(J)` lists `∂²ℓ/∂θ_r∂θ_c` for `r ≤ c` row by row. The lower
//!   triangle is mirrored on evaluation.
//! - Shared sub-expressions of all outputs are evaluated once per call.
//!
//! Invariants & assumptions
//! ------------------------
//! - `θ_0` is the shape parameter `b` and must lie in `(0, 1)`; covariate
//!   weights are unrestricted.
//! - Non-finite tape outputs are errors, which the root finder treats as a
//!   rejected trial point.
use log::debug;
use ndarray::{Array1, Array2};

use crate::{
    models::{LikelihoodData, ModelKind, SymbolicLogLikelihood},
    optimization::{
        errors::OptResult,
        loglik_optimizer::Theta,
        root_finder::{ScoreEquations, ScoreEval},
    },
    symbolic::{SymbolicResult, Tape, derivative, gradient},
};

#[derive(Debug, Clone)]
pub struct CompiledScoreSystem {
    kind: ModelKind,
    tape: Tape,
    dim: usize,
}

impl CompiledScoreSystem {
    /// Record, differentiate and compile the log-likelihood of `kind` on
    /// `data`.
    ///
    /// # Errors
    /// Any [`SymbolicError`](crate::symbolic::SymbolicError) raised while
    /// building the expression, e.g. `DegenerateData` for zero failures.
    pub fn build(kind: ModelKind, data: &LikelihoodData) -> SymbolicResult<Self> {
        let SymbolicLogLikelihood { mut graph, root } = SymbolicLogLikelihood::build(kind, data)?;
        let dim = graph.n_vars();
        let scores = gradient(&mut graph, root)?;
        debug!("{kind}: log-likelihood differentiated ({} nodes, {dim} parameters)", graph.len());

        let mut outputs = Vec::with_capacity(1 + dim + dim * (dim + 1) / 2);
        outputs.push(root);
        outputs.extend_from_slice(&scores);
        for (r, &score) in scores.iter().enumerate() {
            for c in r..dim {
                outputs.push(derivative(&mut graph, score, c)?);
            }
        }
        let tape = Tape::compile(&graph, &outputs);
        debug!("{kind}: score system compiled ({} instructions)", tape.len());
        Ok(Self { kind, tape, dim })
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }
}

impl ScoreEquations for CompiledScoreSystem {
    fn dim(&self) -> usize {
        self.dim
    }

    fn evaluate(&self, theta: &Theta) -> OptResult<ScoreEval> {
        let values = self.tape.evaluate(&theta.to_vec())?;
        let d = self.dim;
        let score = Array1::from(values[1..=d].to_vec());
        let mut jacobian = Array2::zeros((d, d));
        let mut upper = values[1 + d..].iter();
        for r in 0..d {
            for c in r..d {
                let v = upper.next().copied().unwrap_or(f64::NAN);
                jacobian[[r, c]] = v;
                jacobian[[c, r]] = v;
            }
        }
        Ok(ScoreEval { log_likelihood: values[0], score, jacobian })
    }

    fn in_domain(&self, theta: &Theta) -> bool {
        let (lo, hi) = self.kind.shape_domain();
        theta.get(0).is_some_and(|&b| b > lo && b < hi)
    }
}
