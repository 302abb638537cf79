//! data — failure-count datasets and their import.
//!
//! [`FailureDataSet`] is the validated, immutable input every model is
//! fitted to. It can be built directly from columns or parsed from a CSV
//! table (see [`table`]). Structural problems are reported as [`DataError`]
//! and abort a whole estimation request.
pub mod dataset;
pub mod errors;
pub mod table;

pub use self::dataset::{Covariate, FailureDataSet};
pub use self::errors::{DataError, DataResult};
