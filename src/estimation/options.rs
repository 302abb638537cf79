//! estimation::options — engine configuration.
//!
//! Purpose
//! -------
//! Collect every tunable of a fit in one serde-backed value that can be
//! built in code or loaded from TOML: Newton root-finder settings, L-BFGS
//! settings for the direct pipeline, how the single initial guess is
//! chosen, whether jobs fan out in parallel, and per-model overrides of
//! the initial-guess ranges.
//!
//! Key behaviors
//! -------------
//! - Every table and field is optional in TOML; missing entries take the
//!   [`Default`] values.
//! - [`EngineConfig::validate`] runs the same validation the solver
//!   options apply at construction (`RootOptions::new`, `Tolerances::new`,
//!   `MLEOptions::new`) and validates every range override against its
//!   model's domain.
//!
//! Conventions
//! -----------
//! - Range overrides are keyed by model short code (`"GM"`, `"DW2"`, ...),
//!   matched case-insensitively.
//!
//! Example
//! -------
//! ```toml
//! parallel = true
//! init = { kind = "seeded", seed = 7 }
//!
//! [root]
//! tol_score = 1e-10
//!
//! [direct]
//! line_searcher = "HagerZhang"
//!
//! [ranges.DW2]
//! shape = { lo = 0.5, hi = 0.95 }
//! ```
use std::{collections::BTreeMap, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    estimation::errors::{ConfigError, EstimationError},
    models::{ModelKind, ModelSpec, ParamRange},
    optimization::{
        errors::OptResult,
        loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
        root_finder::RootOptions,
    },
};

/// How the single initial guess of each fit is taken from its ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitStrategy {
    /// Centre of each range.
    #[default]
    Midpoint,
    /// Uniform draw inside each range from a generator seeded with `seed`.
    Seeded { seed: u64 },
}

/// L-BFGS settings of the direct pipeline, in the shape of
/// [`Tolerances`] plus [`MLEOptions`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectSettings {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
    pub line_searcher: LineSearcher,
    pub lbfgs_mem: Option<usize>,
}

impl Default for DirectSettings {
    fn default() -> Self {
        let defaults = MLEOptions::default();
        Self {
            tol_grad: defaults.tols.tol_grad,
            tol_cost: defaults.tols.tol_cost,
            max_iter: defaults.tols.max_iter,
            line_searcher: defaults.line_searcher,
            lbfgs_mem: defaults.lbfgs_mem,
        }
    }
}

/// Replacement ranges for one model; `None` keeps the model default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeOverride {
    pub shape: Option<ParamRange>,
    pub cox: Option<ParamRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub root: RootOptions,
    pub direct: DirectSettings,
    pub init: InitStrategy,
    /// Fan jobs of a batch out over the rayon pool.
    pub parallel: bool,
    pub ranges: BTreeMap<String, RangeOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: RootOptions::default(),
            direct: DirectSettings::default(),
            init: InitStrategy::Midpoint,
            parallel: true,
            ranges: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    /// - [`ConfigError::Invalid`] for solver settings the optimizer layer
    ///   rejects.
    /// - [`ConfigError::Range`] for an override keyed by an unknown model
    ///   code or whose ranges leave the model's domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.root_options()?;
        self.mle_options()?;
        for code in self.ranges.keys() {
            let kind = ModelKind::from_short_name(code)
                .ok_or_else(|| EstimationError::UnknownModel { name: code.clone() })?;
            self.spec_for(kind).validate()?;
        }
        Ok(())
    }

    /// Root-finder options, revalidated.
    pub fn root_options(&self) -> OptResult<RootOptions> {
        RootOptions::new(self.root.tol_score, self.root.max_iter, self.root.max_backtracks)
    }

    /// Direct-pipeline optimizer options, revalidated.
    pub fn mle_options(&self) -> OptResult<MLEOptions> {
        let d = &self.direct;
        let tols = Tolerances::new(d.tol_grad, d.tol_cost, d.max_iter)?;
        MLEOptions::new(tols, d.line_searcher, d.lbfgs_mem)
    }

    /// `kind`'s default spec with any configured range overrides applied.
    pub fn spec_for(&self, kind: ModelKind) -> ModelSpec {
        let spec = ModelSpec::new(kind);
        match self.override_for(kind) {
            Some(o) => {
                let spec = o.shape.map_or(spec, |r| spec.with_shape_range(r));
                o.cox.map_or(spec, |r| spec.with_cox_range(r))
            }
            None => spec,
        }
    }

    fn override_for(&self, kind: ModelKind) -> Option<&RangeOverride> {
        self.ranges
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(kind.short_name()))
            .map(|(_, o)| o)
    }
}
