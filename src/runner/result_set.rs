//! Aggregated results of one batch and model-comparison helpers.
use std::{
    cmp::Ordering,
    collections::{BTreeMap, btree_map},
    fmt,
    str::FromStr,
};

use crate::estimation::{FitResult, ResultKey};

/// Goodness-of-fit measure used to rank converged results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Aic,
    Bic,
    Sse,
    /// Log-likelihood; ranked in descending order.
    Llf,
}

impl Criterion {
    fn value(self, fit: &FitResult) -> Option<f64> {
        match self {
            Criterion::Aic => fit.aic_val(),
            Criterion::Bic => fit.bic_val(),
            Criterion::Sse => fit.sse_val(),
            Criterion::Llf => fit.llf_val(),
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Criterion::Aic => "AIC",
            Criterion::Bic => "BIC",
            Criterion::Sse => "SSE",
            Criterion::Llf => "LLF",
        })
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aic" => Ok(Criterion::Aic),
            "bic" => Ok(Criterion::Bic),
            "sse" => Ok(Criterion::Sse),
            "llf" | "loglik" => Ok(Criterion::Llf),
            other => Err(format!("unknown criterion '{other}' (expected aic, bic, sse or llf)")),
        }
    }
}

/// Every job's result of a batch, ordered by [`ResultKey`]. Non-converged
/// entries are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimationResultSet {
    results: BTreeMap<ResultKey, FitResult>,
}

impl EstimationResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result under its own key, replacing any earlier one.
    pub fn insert(&mut self, fit: FitResult) {
        self.results.insert(fit.key.clone(), fit);
    }

    pub fn get(&self, key: &ResultKey) -> Option<&FitResult> {
        self.results.get(key)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ResultKey, FitResult> {
        self.results.iter()
    }

    pub fn converged(&self) -> impl Iterator<Item = &FitResult> {
        self.results.values().filter(|fit| fit.converged)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FitResult> {
        self.results.values().filter(|fit| !fit.converged)
    }

    /// Converged results, best first: ascending AIC, BIC or SSE, or
    /// descending LLF. Ties keep key order.
    pub fn ranked_by(&self, criterion: Criterion) -> Vec<&FitResult> {
        let mut ranked: Vec<(&FitResult, f64)> = self
            .converged()
            .filter_map(|fit| criterion.value(fit).map(|v| (fit, v)))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| match criterion {
            Criterion::Llf => b.partial_cmp(a).unwrap_or(Ordering::Equal),
            _ => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        });
        ranked.into_iter().map(|(fit, _)| fit).collect()
    }
}

impl FromIterator<FitResult> for EstimationResultSet {
    fn from_iter<I: IntoIterator<Item = FitResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for fit in iter {
            set.insert(fit);
        }
        set
    }
}

impl<'a> IntoIterator for &'a EstimationResultSet {
    type Item = (&'a ResultKey, &'a FitResult);
    type IntoIter = btree_map::Iter<'a, ResultKey, FitResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
