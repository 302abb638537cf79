//! estimation::pipeline — one (model, covariate selection) job end to end.
//!
//! Purpose
//! -------
//! Run a single fit: validate the spec, extract the job's data, take the
//! initial guess, dispatch to the symbolic (Newton on compiled score
//! equations) or direct (L-BFGS) backend, and assemble the result.
//!
//! Key behaviors
//! -------------
//! - [`try_estimate`] returns every failure as an [`EstimationError`].
//! - [`estimate`] never fails: errors become a non-converged [`FitResult`]
//!   carrying a [`FitFailure`], and the outcome is logged.
//!
//! Invariants & assumptions
//! ------------------------
//! - Exactly one initial guess per job; no restarts.
//! - Each job compiles its own score system and never shares it.
//! - Identical inputs and config give identical results.
use log::{debug, info, warn};

use crate::{
    data::FailureDataSet,
    estimation::{
        direct::{SHAPE_SCORE_TOL, fit_direct},
        errors::{EstimationError, EstimationResult},
        fit::{FitFailure, FitParameters, FitResult, ResultKey},
        init::initial_guess,
        options::EngineConfig,
        score_system::CompiledScoreSystem,
    },
    models::{HazardModel, LikelihoodData, ModelSpec, log_likelihood},
    optimization::{loglik_optimizer::Theta, root_finder::solve_score_equations},
};

fn split(theta: &Theta) -> FitParameters {
    FitParameters { b: theta[0], betas: theta.iter().skip(1).copied().collect() }
}

/// Solver result common to both backends.
struct Solved {
    theta: Theta,
    llf: f64,
    converged: bool,
    status: String,
    iterations: usize,
}

/// Fit `spec` to `dataset` restricted to the `metrics` covariates.
///
/// # Errors
/// - [`EstimationError::InvalidModelSpec`] for malformed ranges.
/// - [`EstimationError::UnsupportedCovariates`] when covariates are
///   requested from a covariate-free spec.
/// - [`EstimationError::Data`] for unknown metric names.
/// - [`EstimationError::SymbolicConstruction`] for degenerate data.
/// - [`EstimationError::Optimization`] for solver configuration or backend
///   failures.
/// - [`EstimationError::NonConvergence`] when the solver stops without
///   meeting its tolerance.
/// - [`EstimationError::NumericDomain`] for estimates outside the domain,
///   direct fits that stop on the boundary of `b`, and starting points
///   whose log-likelihood is not finite.
pub fn try_estimate(
    spec: &ModelSpec, dataset: &FailureDataSet, metrics: &[String], config: &EngineConfig,
) -> EstimationResult<FitResult> {
    let kind = spec.kind;
    spec.validate()?;
    if !metrics.is_empty() && !spec.supports_covariates() {
        return Err(EstimationError::UnsupportedCovariates { model: kind.short_name().to_string() });
    }
    let data = LikelihoodData::new(dataset, metrics)?;
    let theta0 = initial_guess(spec, data.num_covariates(), &config.init);
    debug!("{kind}: initial estimates {theta0}");

    // Surfaces degenerate data before any solver work.
    let ll0 = log_likelihood(kind, theta0[0], &theta0.to_vec()[1..], &data)?;
    if !ll0.is_finite() {
        return Err(EstimationError::NumericDomain {
            model: kind.short_name().to_string(),
            parameter: "log-likelihood at the initial guess",
            value: ll0,
        });
    }

    let solved = if spec.supports_symbolic_fit() {
        let system = CompiledScoreSystem::build(kind, &data)?;
        let outcome = solve_score_equations(&system, theta0, &config.root_options()?)?;
        Solved {
            converged: outcome.converged(),
            status: outcome.status.to_string(),
            llf: outcome.log_likelihood,
            iterations: outcome.iterations,
            theta: outcome.theta_hat,
        }
    } else {
        let fit = fit_direct(kind, &data, &theta0, &config.mle_options()?)?;
        if fit.converged && !(fit.shape_score.abs() < SHAPE_SCORE_TOL) {
            debug!("{kind}: optimizer stopped on the boundary, shape score {}", fit.shape_score);
            return Err(EstimationError::NumericDomain {
                model: kind.short_name().to_string(),
                parameter: "b",
                value: fit.theta_hat[0],
            });
        }
        Solved {
            converged: fit.converged,
            status: fit.status,
            llf: fit.log_likelihood,
            iterations: fit.iterations,
            theta: fit.theta_hat,
        }
    };

    if !solved.converged {
        return Err(EstimationError::NonConvergence {
            model: kind.short_name().to_string(),
            iterations: solved.iterations,
            status: solved.status,
        });
    }
    FitResult::assemble(
        kind,
        ResultKey::new(kind.short_name(), metrics),
        dataset.time().to_vec(),
        split(&solved.theta),
        solved.llf,
        &data,
        solved.iterations,
    )
}

/// Fit one job, folding any failure into a non-converged result.
pub fn estimate(
    spec: &ModelSpec, dataset: &FailureDataSet, metrics: &[String], config: &EngineConfig,
) -> FitResult {
    let key = ResultKey::new(spec.short_name(), metrics);
    match try_estimate(spec, dataset, metrics, config) {
        Ok(fit) => {
            info!(
                "{key}: converged in {} iterations, b = {:.6}, LLF = {:.4}",
                fit.iterations(),
                fit.parameters().map_or(f64::NAN, |p| p.b),
                fit.llf_val().unwrap_or(f64::NAN)
            );
            fit
        }
        Err(err) => {
            warn!("{key}: {err}");
            FitResult::failed(key, spec.name(), dataset.time().to_vec(), FitFailure::from(&err))
        }
    }
}
