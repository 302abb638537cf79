//! data::dataset — validated, immutable failure-count table.
//!
//! Purpose
//! -------
//! Hold the interval-level observations every model is fitted to: a time
//! axis, the cumulative failure count per interval, the derived
//! per-interval counts, and zero or more named covariate columns.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one interval; every column has the same length.
//! - All values are finite; cumulative counts are non-negative and
//!   non-decreasing, so per-interval counts are non-negative.
//! - Covariate names are unique. Column order is preserved and defines the
//!   order of the weight parameters for any metric selection.
//!
//! Downstream usage
//! ----------------
//! - Shared read-only (`Arc<FailureDataSet>`) with the estimation runner.
//! - [`FailureDataSet::covariate_matrix`] materializes the `n × k` block
//!   for one metric combination; [`FailureDataSet::metric_name_combinations`]
//!   enumerates every combination a caller may request.
use std::collections::HashSet;

use itertools::Itertools;
use ndarray::{Array1, Array2};

use crate::data::errors::{DataError, DataResult};

/// One named covariate column.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariate {
    pub name: String,
    pub values: Array1<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailureDataSet {
    time: Array1<f64>,
    cumulative: Array1<f64>,
    counts: Array1<f64>,
    covariates: Vec<Covariate>,
}

impl FailureDataSet {
    /// Build a dataset from a time axis, cumulative failures and named
    /// covariate columns.
    ///
    /// # Errors
    /// - [`DataError::Empty`] if there are no intervals.
    /// - [`DataError::LengthMismatch`] if any column length differs from `time`.
    /// - [`DataError::NonFinite`], [`DataError::NegativeCumulative`],
    ///   [`DataError::DecreasingCumulative`] for invalid values.
    /// - [`DataError::DuplicateMetric`] for repeated covariate names.
    pub fn new(
        time: Vec<f64>, cumulative: Vec<f64>, covariates: Vec<(String, Vec<f64>)>,
    ) -> DataResult<Self> {
        let n = time.len();
        if n == 0 {
            return Err(DataError::Empty);
        }
        check_column("time", &time, n)?;
        check_column("cumulative", &cumulative, n)?;

        let mut previous = 0.0;
        for (row, &value) in cumulative.iter().enumerate() {
            if value < 0.0 {
                return Err(DataError::NegativeCumulative { row, value });
            }
            if value < previous {
                return Err(DataError::DecreasingCumulative { row, previous, value });
            }
            previous = value;
        }

        let mut seen = HashSet::new();
        let mut columns = Vec::with_capacity(covariates.len());
        for (name, values) in covariates {
            check_column(&name, &values, n)?;
            if !seen.insert(name.clone()) {
                return Err(DataError::DuplicateMetric { name });
            }
            columns.push(Covariate { name, values: Array1::from(values) });
        }

        let counts: Array1<f64> = cumulative
            .iter()
            .scan(0.0, |prev, &c| {
                let d = c - *prev;
                *prev = c;
                Some(d)
            })
            .collect();

        Ok(Self {
            time: Array1::from(time),
            cumulative: Array1::from(cumulative),
            counts,
            covariates: columns,
        })
    }

    /// Build a dataset from per-interval failure counts instead of a
    /// cumulative column.
    ///
    /// # Errors
    /// Same as [`FailureDataSet::new`]; a negative count shows up as a
    /// decreasing cumulative value.
    pub fn from_counts(
        time: Vec<f64>, counts: Vec<f64>, covariates: Vec<(String, Vec<f64>)>,
    ) -> DataResult<Self> {
        check_column("counts", &counts, time.len())?;
        let cumulative = counts
            .iter()
            .scan(0.0, |acc, &c| {
                *acc += c;
                Some(*acc)
            })
            .collect();
        Self::new(time, cumulative, covariates)
    }

    pub fn n_intervals(&self) -> usize {
        self.time.len()
    }

    pub fn time(&self) -> &Array1<f64> {
        &self.time
    }

    pub fn cumulative(&self) -> &Array1<f64> {
        &self.cumulative
    }

    /// Failures observed in each interval.
    pub fn counts(&self) -> &Array1<f64> {
        &self.counts
    }

    pub fn total_failures(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    pub fn covariates(&self) -> &[Covariate] {
        &self.covariates
    }

    pub fn num_covariates(&self) -> usize {
        self.covariates.len()
    }

    pub fn metric_names(&self) -> Vec<&str> {
        self.covariates.iter().map(|c| c.name.as_str()).collect()
    }

    /// Check that every name is a known, non-repeated covariate.
    pub fn validate_metrics(&self, names: &[String]) -> DataResult<()> {
        let mut seen = HashSet::new();
        for name in names {
            if !self.covariates.iter().any(|c| &c.name == name) {
                return Err(DataError::UnknownMetric { name: name.clone() });
            }
            if !seen.insert(name) {
                return Err(DataError::DuplicateMetric { name: name.clone() });
            }
        }
        Ok(())
    }

    /// `n × k` covariate block for the given metric names, columns in the
    /// order requested.
    pub fn covariate_matrix(&self, names: &[String]) -> DataResult<Array2<f64>> {
        self.validate_metrics(names)?;
        let n = self.n_intervals();
        let mut out = Array2::<f64>::zeros((n, names.len()));
        for (j, name) in names.iter().enumerate() {
            let column = self
                .covariates
                .iter()
                .find(|c| &c.name == name)
                .ok_or_else(|| DataError::UnknownMetric { name: name.clone() })?;
            out.column_mut(j).assign(&column.values);
        }
        Ok(out)
    }

    /// Every subset of the covariate columns: the empty selection first,
    /// then by size, each subset in column order.
    pub fn metric_name_combinations(&self) -> Vec<Vec<String>> {
        let names: Vec<String> = self.covariates.iter().map(|c| c.name.clone()).collect();
        (0..=names.len())
            .flat_map(|size| names.iter().cloned().combinations(size))
            .collect()
    }
}

fn check_column(column: &str, values: &[f64], expected: usize) -> DataResult<()> {
    if values.len() != expected {
        return Err(DataError::LengthMismatch {
            column: column.to_string(),
            expected,
            found: values.len(),
        });
    }
    if let Some((row, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(DataError::NonFinite { column: column.to_string(), row, value });
    }
    Ok(())
}
