//! srgm_fit — covariate software reliability growth model estimation.
//!
//! Purpose
//! -------
//! Fit discrete software-reliability-growth models with optional
//! proportional-hazards covariates to interval failure counts, and report
//! maximum-likelihood parameters, expected total faults, fitted mean-value
//! and intensity curves, and comparison metrics (LLF, AIC, BIC, SSE).
//!
//! Key behaviors
//! -------------
//! - [`models`] defines the hazard laws and the profile log-likelihood,
//!   written once over a numeric trait so the same code runs on `f64` and
//!   on [`symbolic`] expressions.
//! - [`estimation`] differentiates the likelihood symbolically and solves
//!   the score equations with damped Newton, or maximizes it directly with
//!   L-BFGS for variants without a symbolic fit ([`optimization`]).
//! - [`runner`] fans (model × covariate selection) jobs out on a worker
//!   thread and the rayon pool, isolating per-job failures.
//!
//! Invariants & assumptions
//! ------------------------
//! - Datasets are validated at construction and shared read-only.
//! - Metrics exist only for converged fits.
//!
//! Conventions
//! -----------
//! - Parameters are ordered `(b, β_1..β_k)`: shape first, then one weight
//!   per selected covariate in the order requested.
//! - Interval indices in formulas are 1-based; vectors are 0-based.
//! - Progress is reported through the `log` facade; the library never
//!   installs a logger.
//!
//! Downstream usage
//! ----------------
//! ```no_run
//! use std::sync::Arc;
//! use srgm_fit::prelude::*;
//!
//! let data = Arc::new(FailureDataSet::from_csv_path("failures.csv")?);
//! let runner = EstimationRunner::new(EngineConfig::default())?;
//! let models = ModelKind::ALL.into_iter().map(ModelSpec::new).collect();
//! let request = EstimationRequest::all_combinations(models, &data);
//! let results = runner.run(request, data)?.wait()?;
//! for fit in results.ranked_by(Criterion::Aic) {
//!     println!("{} AIC = {:?}", fit.key, fit.aic_val());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` exercises the full
//!   pipeline on datasets with known estimates.

pub mod data;
pub mod estimation;
pub mod models;
pub mod optimization;
pub mod runner;
pub mod symbolic;

pub mod prelude {
    pub use crate::data::{DataError, FailureDataSet};
    pub use crate::estimation::{
        EngineConfig, EstimationError, FitResult, InitStrategy, ResultKey, estimate,
    };
    pub use crate::models::{HazardModel, ModelKind, ModelSpec, ParamRange};
    pub use crate::runner::{
        BatchHandle, Criterion, EstimationRequest, EstimationResultSet, EstimationRunner,
        RunnerError,
    };
}
