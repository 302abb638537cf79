//! runner — concurrent estimation of model batches.
//!
//! Purpose
//! -------
//! Accept an [`EstimationRequest`] (models × metric combinations) against a
//! shared [`FailureDataSet`](crate::data::FailureDataSet) and produce an
//! [`EstimationResultSet`] without blocking the caller.
//!
//! Key behaviors
//! -------------
//! - Request-level problems (unknown metric names, bad configuration) are
//!   returned synchronously as [`RunnerError`] before any job starts.
//! - Jobs run on a dedicated worker thread, in parallel over the rayon pool
//!   unless the config disables it.
//! - A failure inside one job, including a panic, only marks that job's
//!   result as non-converged.
//! - Each batch gets a generation number; starting a batch supersedes every
//!   earlier one still in flight.
//!
//! Invariants & assumptions
//! ------------------------
//! - Jobs share only read-only data (`Arc<FailureDataSet>`,
//!   `Arc<EngineConfig>`); results are aggregated into an ordered map, so
//!   completion order does not affect the result set.
//! - There is no cancellation: superseded batches run to completion and
//!   their results are dropped.
pub mod batch;
pub mod errors;
pub mod result_set;

pub use self::batch::{BatchHandle, CallbackHandle, EstimationRequest, EstimationRunner};
pub use self::errors::{RunnerError, RunnerResult};
pub use self::result_set::{Criterion, EstimationResultSet};
