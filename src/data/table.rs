//! CSV import for rectangular failure tables.
//!
//! Layout accepted (header row required):
//! - the first column is the time axis (or interval index);
//! - a `Cumulative` or `CFC` column holds cumulative failures, otherwise an
//!   `FC` column holds per-interval failure counts;
//! - every remaining column is a covariate, named by its header.
//!
//! Header matching is case-insensitive and ignores surrounding whitespace.
use std::{fs::File, io::Read, path::Path};

use csv::{ReaderBuilder, Trim};

use crate::data::{
    dataset::FailureDataSet,
    errors::{DataError, DataResult},
};

const CUMULATIVE_HEADERS: [&str; 2] = ["cumulative", "cfc"];
const COUNT_HEADERS: [&str; 1] = ["fc"];

impl FailureDataSet {
    /// Parse a failure table from any CSV source.
    ///
    /// # Errors
    /// - [`DataError::Csv`] for malformed CSV (including ragged rows).
    /// - [`DataError::MissingColumn`] if neither a cumulative nor a count
    ///   column is present.
    /// - [`DataError::Parse`] for non-numeric fields.
    /// - Any validation error from [`FailureDataSet::new`].
    pub fn from_csv_reader<R: Read>(reader: R) -> DataResult<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).trim(Trim::All).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        if headers.len() < 2 {
            return Err(DataError::MissingColumn { name: "Cumulative".to_string() });
        }

        let find = |names: &[&str]| {
            headers.iter().position(|h| names.iter().any(|n| h.eq_ignore_ascii_case(n)))
        };
        let cumulative_col = find(&CUMULATIVE_HEADERS[..]);
        let count_col = find(&COUNT_HEADERS[..]);
        if cumulative_col.is_none() && count_col.is_none() {
            return Err(DataError::MissingColumn { name: "Cumulative".to_string() });
        }

        let mut columns: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            for (j, raw) in record.iter().enumerate() {
                let value = raw.parse::<f64>().map_err(|_| DataError::Parse {
                    row,
                    column: headers[j].clone(),
                    raw: raw.to_string(),
                })?;
                columns[j].push(value);
            }
        }

        let covariates: Vec<(String, Vec<f64>)> = headers
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != 0 && Some(*j) != cumulative_col && Some(*j) != count_col)
            .map(|(j, name)| (name.clone(), columns[j].clone()))
            .collect();
        let time = std::mem::take(&mut columns[0]);

        match cumulative_col {
            Some(j) => Self::new(time, std::mem::take(&mut columns[j]), covariates),
            None => {
                let j = count_col.ok_or_else(|| DataError::MissingColumn {
                    name: "FC".to_string(),
                })?;
                Self::from_counts(time, std::mem::take(&mut columns[j]), covariates)
            }
        }
    }

    /// Parse a failure table from a CSV file on disk.
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> DataResult<Self> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Column detection, count-to-cumulative conversion, parse failures and
    // reading from a file on disk.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A cumulative column is detected and remaining columns become covariates.
    //
    // Given
    // -----
    // - Header `T, FC, E, F, CFC` with three rows.
    //
    // Expect
    // ------
    // - Cumulative from CFC, covariates [E, F] in header order.
    fn cumulative_column_and_covariates_are_detected() {
        // Arrange
        let text = "T,FC,E,F,CFC\n1,2,4.0,1,2\n2,1,6.5,0,3\n3,4,5.0,2,7\n";

        // Act
        let ds = FailureDataSet::from_csv_reader(text.as_bytes()).unwrap();

        // Assert
        assert_eq!(ds.cumulative(), &array![2.0, 3.0, 7.0]);
        assert_eq!(ds.metric_names(), vec!["E", "F"]);
        assert_eq!(ds.time(), &array![1.0, 2.0, 3.0]);
    }

    #[test]
    // Purpose
    // -------
    // Without a cumulative column the per-interval counts are accumulated.
    //
    // Given
    // -----
    // - Header `Interval, FC` with counts [1, 0, 2].
    //
    // Expect
    // ------
    // - Cumulative [1, 1, 3], no covariates.
    fn count_column_is_accumulated() {
        // Arrange
        let text = "Interval, FC\n1, 1\n2, 0\n3, 2\n";

        // Act
        let ds = FailureDataSet::from_csv_reader(text.as_bytes()).unwrap();

        // Assert
        assert_eq!(ds.cumulative(), &array![1.0, 1.0, 3.0]);
        assert_eq!(ds.num_covariates(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Non-numeric fields and missing failure columns are reported.
    //
    // Given
    // -----
    // - A table with "abc" in a covariate, and a table with no FC/CFC column.
    //
    // Expect
    // ------
    // - `DataError::Parse` and `DataError::MissingColumn` respectively.
    fn malformed_tables_are_rejected() {
        // Arrange
        let bad_value = "T,CFC,E\n1,2,abc\n";
        let no_failures = "T,E\n1,2\n";

        // Act
        let parse = FailureDataSet::from_csv_reader(bad_value.as_bytes());
        let missing = FailureDataSet::from_csv_reader(no_failures.as_bytes());

        // Assert
        assert!(matches!(parse, Err(DataError::Parse { row: 0, .. })));
        assert!(matches!(missing, Err(DataError::MissingColumn { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Files on disk load through the same path as in-memory readers.
    //
    // Given
    // -----
    // - A temporary CSV file with a cumulative column.
    //
    // Expect
    // ------
    // - The parsed dataset has the written values.
    fn loads_from_path() {
        // Arrange
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "T,Cumulative").unwrap();
        writeln!(file, "1,5").unwrap();
        writeln!(file, "2,9").unwrap();
        file.flush().unwrap();

        // Act
        let ds = FailureDataSet::from_csv_path(file.path()).unwrap();

        // Assert
        assert_eq!(ds.cumulative(), &array![5.0, 9.0]);
        assert_eq!(ds.counts(), &array![5.0, 4.0]);
    }
}
