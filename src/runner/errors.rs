//! Request-level failures of the estimation runner.
//!
//! Only problems that invalidate a whole batch live here; per-model
//! failures are carried inside each [`FitResult`](crate::estimation::FitResult).
use thiserror::Error;

use crate::{data::DataError, estimation::ConfigError};

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Invalid estimation request: {0}")]
    Data(#[from] DataError),

    /// Two jobs of one request would produce the same result key.
    #[error("Invalid estimation request: job {key} is listed more than once")]
    DuplicateJob { key: String },

    #[error("Invalid engine configuration: {0}")]
    Config(#[from] ConfigError),

    /// A newer batch was started before this one was collected.
    #[error("Batch {generation} was superseded by a newer request")]
    Superseded { generation: u64 },

    #[error("Estimation worker exited without delivering results")]
    WorkerLost,

    #[error("Failed to spawn estimation worker: {0}")]
    Spawn(#[from] std::io::Error),
}
