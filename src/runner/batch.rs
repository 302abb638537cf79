//! Background execution of estimation batches.
//!
//! A batch is every (model × metric combination) job of one
//! [`EstimationRequest`]. [`EstimationRunner::run`] validates the request on
//! the caller's thread, then hands the jobs to a dedicated worker thread
//! that fans them out over the rayon pool and delivers the aggregated
//! [`EstimationResultSet`] through a bounded channel.
//!
//! Each `run` bumps a shared generation counter. Only the newest batch is
//! authoritative: an older [`BatchHandle`] reports
//! [`RunnerError::Superseded`], and an older callback is never invoked.
use std::{
    any::Any,
    collections::BTreeSet,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
};

use crossbeam_channel::{Receiver, TryRecvError, bounded};
use log::{info, warn};
use rayon::prelude::*;

use crate::{
    data::FailureDataSet,
    estimation::{EngineConfig, FitFailure, FitResult, ResultKey, estimate},
    models::ModelSpec,
    runner::{
        errors::{RunnerError, RunnerResult},
        result_set::EstimationResultSet,
    },
};

/// Models to fit and the covariate selections to fit each of them on.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationRequest {
    pub models: Vec<ModelSpec>,
    /// Metric-name combinations; an empty list means one covariate-free
    /// selection.
    pub metric_names: Vec<Vec<String>>,
}

impl EstimationRequest {
    pub fn new(models: Vec<ModelSpec>, metric_names: Vec<Vec<String>>) -> Self {
        Self { models, metric_names }
    }

    /// Request every covariate subset of `dataset`, empty subset first.
    pub fn all_combinations(models: Vec<ModelSpec>, dataset: &FailureDataSet) -> Self {
        Self::new(models, dataset.metric_name_combinations())
    }

    /// Check every metric combination against `dataset`, and that no two
    /// jobs share a result key.
    ///
    /// # Errors
    /// - [`RunnerError::Data`] for unknown or repeated metric names.
    /// - [`RunnerError::DuplicateJob`] when two specs with the same short
    ///   code meet the same metric combination.
    pub fn validate(&self, dataset: &FailureDataSet) -> RunnerResult<()> {
        self.metric_names.iter().try_for_each(|names| dataset.validate_metrics(names))?;
        let mut seen = BTreeSet::new();
        for (spec, names) in self.jobs() {
            let key = ResultKey::new(spec.short_name(), &names);
            if !seen.insert(key.clone()) {
                return Err(RunnerError::DuplicateJob { key: key.to_string() });
            }
        }
        Ok(())
    }

    /// The cross product of models and metric combinations, model-major.
    pub fn jobs(&self) -> Vec<(ModelSpec, Vec<String>)> {
        let selections: Vec<Vec<String>> = if self.metric_names.is_empty() {
            vec![Vec::new()]
        } else {
            self.metric_names.clone()
        };
        self.models
            .iter()
            .flat_map(|spec| selections.iter().map(move |names| (*spec, names.clone())))
            .collect()
    }
}

/// Runs estimation batches against a fixed [`EngineConfig`].
///
/// Clones share the generation counter, so a batch started from any clone
/// supersedes batches started from the others.
#[derive(Debug, Clone)]
pub struct EstimationRunner {
    config: Arc<EngineConfig>,
    generation: Arc<AtomicU64>,
}

impl EstimationRunner {
    /// # Errors
    /// [`RunnerError::Config`] if `config` does not validate.
    pub fn new(config: EngineConfig) -> RunnerResult<Self> {
        config.validate()?;
        Ok(Self { config: Arc::new(config), generation: Arc::new(AtomicU64::new(0)) })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generation of the most recently started batch (0 before any).
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Validate `request` and start it on a worker thread.
    ///
    /// # Errors
    /// - [`RunnerError::Data`] for unknown or repeated metric names.
    /// - [`RunnerError::DuplicateJob`] for jobs that would share a key.
    /// - [`RunnerError::Spawn`] if the worker thread cannot be created.
    pub fn run(
        &self, request: EstimationRequest, dataset: Arc<FailureDataSet>,
    ) -> RunnerResult<BatchHandle> {
        let (generation, jobs) = self.prepare(&request, &dataset)?;
        let (tx, rx) = bounded(1);
        let config = Arc::clone(&self.config);
        thread::Builder::new().name(format!("srgm-batch-{generation}")).spawn(move || {
            let results = execute(generation, &jobs, &dataset, &config);
            // The handle may already be dropped.
            let _ = tx.send(results);
        })?;
        Ok(BatchHandle { generation, latest: Arc::clone(&self.generation), rx })
    }

    /// Like [`run`](Self::run), but deliver the results to `callback` on the
    /// worker thread. The callback is skipped if a newer batch has started
    /// by the time this one finishes.
    ///
    /// # Errors
    /// Same as [`run`](Self::run).
    pub fn run_with_callback<F>(
        &self, request: EstimationRequest, dataset: Arc<FailureDataSet>, callback: F,
    ) -> RunnerResult<CallbackHandle>
    where
        F: FnOnce(EstimationResultSet) + Send + 'static,
    {
        let (generation, jobs) = self.prepare(&request, &dataset)?;
        let config = Arc::clone(&self.config);
        let latest = Arc::clone(&self.generation);
        let worker =
            thread::Builder::new().name(format!("srgm-batch-{generation}")).spawn(move || {
                let results = execute(generation, &jobs, &dataset, &config);
                if latest.load(Ordering::SeqCst) != generation {
                    info!("batch {generation}: superseded, results discarded");
                    return false;
                }
                callback(results);
                true
            })?;
        Ok(CallbackHandle { generation, worker })
    }

    /// Validate and run `request` on the calling thread. Like
    /// [`run`](Self::run), it starts a new generation, so batches still in
    /// flight become superseded.
    ///
    /// # Errors
    /// Same validation errors as [`run`](Self::run).
    pub fn run_blocking(
        &self, request: &EstimationRequest, dataset: &FailureDataSet,
    ) -> RunnerResult<EstimationResultSet> {
        let (generation, jobs) = self.prepare(request, dataset)?;
        Ok(execute(generation, &jobs, dataset, &self.config))
    }

    fn prepare(
        &self, request: &EstimationRequest, dataset: &FailureDataSet,
    ) -> RunnerResult<(u64, Vec<(ModelSpec, Vec<String>)>)> {
        request.validate(dataset)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        Ok((generation, request.jobs()))
    }
}

/// Pending results of a batch started with [`EstimationRunner::run`].
///
/// Results are delivered at most once, to either [`wait`](Self::wait) or
/// the first successful [`try_result`](Self::try_result).
#[derive(Debug)]
pub struct BatchHandle {
    generation: u64,
    latest: Arc<AtomicU64>,
    rx: Receiver<EstimationResultSet>,
}

impl BatchHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }

    /// Block until the batch finishes.
    ///
    /// # Errors
    /// - [`RunnerError::Superseded`] if a newer batch has started.
    /// - [`RunnerError::WorkerLost`] if the worker died before delivering.
    pub fn wait(self) -> RunnerResult<EstimationResultSet> {
        self.check_current()?;
        let results = self.rx.recv().map_err(|_| RunnerError::WorkerLost)?;
        self.check_current()?;
        Ok(results)
    }

    /// Non-blocking poll; `None` while the batch is still running.
    pub fn try_result(&self) -> Option<RunnerResult<EstimationResultSet>> {
        match self.rx.try_recv() {
            Ok(results) => Some(self.check_current().map(|()| results)),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(RunnerError::WorkerLost)),
        }
    }

    fn check_current(&self) -> RunnerResult<()> {
        if self.is_superseded() {
            return Err(RunnerError::Superseded { generation: self.generation });
        }
        Ok(())
    }
}

/// Worker of a batch started with [`EstimationRunner::run_with_callback`].
#[derive(Debug)]
pub struct CallbackHandle {
    generation: u64,
    worker: JoinHandle<bool>,
}

impl CallbackHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the worker; `true` if the callback was invoked.
    ///
    /// # Errors
    /// [`RunnerError::WorkerLost`] if the worker or the callback panicked.
    pub fn join(self) -> RunnerResult<bool> {
        self.worker.join().map_err(|_| RunnerError::WorkerLost)
    }
}

fn execute(
    generation: u64, jobs: &[(ModelSpec, Vec<String>)], dataset: &FailureDataSet,
    config: &EngineConfig,
) -> EstimationResultSet {
    info!(
        "batch {generation}: {} jobs on {} intervals ({})",
        jobs.len(),
        dataset.n_intervals(),
        if config.parallel { "parallel" } else { "sequential" }
    );
    let run = |(spec, metrics): &(ModelSpec, Vec<String>)| {
        isolate(spec, metrics, dataset, || estimate(spec, dataset, metrics, config))
    };
    let results: EstimationResultSet = if config.parallel {
        jobs.par_iter().map(run).collect::<Vec<_>>().into_iter().collect()
    } else {
        jobs.iter().map(run).collect()
    };
    info!(
        "batch {generation}: finished, {} of {} fits converged",
        results.converged().count(),
        results.len()
    );
    results
}

/// Run one job, turning a panic into a failed result.
fn isolate(
    spec: &ModelSpec, metrics: &[String], dataset: &FailureDataSet,
    job: impl FnOnce() -> FitResult,
) -> FitResult {
    panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let key = ResultKey::new(spec.short_name(), metrics);
        let message = panic_message(payload.as_ref());
        warn!("{key}: job panicked: {message}");
        FitResult::failed(key, spec.name(), dataset.time().to_vec(), FitFailure::panic(message))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::DataError,
        estimation::FailureKind,
        models::{ModelKind, ParamRange},
    };
    use std::sync::Mutex;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // Job expansion, synchronous request validation, channel and callback
    // delivery, superseding, panic isolation, and agreement of parallel and
    // sequential execution.
    // -------------------------------------------------------------------------

    fn dataset() -> Arc<FailureDataSet> {
        Arc::new(
            FailureDataSet::new(
                (1..=10).map(f64::from).collect(),
                vec![12.0, 25.0, 37.0, 48.0, 57.0, 65.0, 72.0, 78.0, 83.0, 87.0],
                vec![(
                    "E".to_string(),
                    vec![4.0, 6.0, 5.0, 8.0, 6.5, 5.0, 7.0, 4.5, 3.0, 5.5],
                )],
            )
            .unwrap(),
        )
    }

    fn gm_request() -> EstimationRequest {
        EstimationRequest::new(vec![ModelSpec::new(ModelKind::Geometric)], vec![])
    }

    #[test]
    // Purpose
    // -------
    // Jobs are the model-major cross product of models and selections.
    //
    // Given
    // -----
    // - Two models and all subsets of one covariate; then an empty
    //   selection list.
    //
    // Expect
    // ------
    // - 4 jobs ordered (GM, []), (GM, [E]), (IFRSB, []), (IFRSB, [E]);
    //   an empty list yields one covariate-free job per model.
    fn jobs_cross_models_and_selections() {
        // Arrange
        let ds = dataset();
        let models =
            vec![ModelSpec::new(ModelKind::Geometric), ModelSpec::new(ModelKind::IfrSalviaBollinger)];

        // Act
        let jobs = EstimationRequest::all_combinations(models.clone(), &ds).jobs();
        let bare = EstimationRequest::new(models, vec![]).jobs();

        // Assert
        let summary: Vec<(ModelKind, usize)> =
            jobs.iter().map(|(spec, names)| (spec.kind, names.len())).collect();
        assert_eq!(
            summary,
            vec![
                (ModelKind::Geometric, 0),
                (ModelKind::Geometric, 1),
                (ModelKind::IfrSalviaBollinger, 0),
                (ModelKind::IfrSalviaBollinger, 1),
            ]
        );
        assert_eq!(bare.len(), 2);
        assert!(bare.iter().all(|(_, names)| names.is_empty()));
    }

    #[test]
    // Purpose
    // -------
    // Unknown metric names fail synchronously without starting a batch.
    //
    // Given
    // -----
    // - A request naming metric "Z".
    //
    // Expect
    // ------
    // - `RunnerError::Data(UnknownMetric)`; the generation stays at 0.
    fn unknown_metric_fails_fast() {
        // Arrange
        let runner = EstimationRunner::new(EngineConfig::default()).unwrap();
        let request = EstimationRequest::new(
            vec![ModelSpec::new(ModelKind::Geometric)],
            vec![vec!["Z".to_string()]],
        );

        // Act
        let out = runner.run(request, dataset());

        // Assert
        assert!(matches!(out, Err(RunnerError::Data(DataError::UnknownMetric { .. }))));
        assert_eq!(runner.current_generation(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Two jobs that would share a result key are rejected up front, so no
    // result can silently replace another.
    //
    // Given
    // -----
    // - Two GM specs, one with a reversed shape range, listed in both
    //   orders over the covariate-free selection.
    //
    // Expect
    // ------
    // - `RunnerError::DuplicateJob { key: "GM" }` for both orders; the
    //   generation stays at 0.
    fn duplicate_jobs_fail_fast() {
        // Arrange
        let runner = EstimationRunner::new(EngineConfig::default()).unwrap();
        let good = ModelSpec::new(ModelKind::Geometric);
        let bad = ModelSpec::new(ModelKind::Geometric).with_shape_range(ParamRange::new(0.9, 0.1));

        // Act
        let outcomes = [
            runner.run(EstimationRequest::new(vec![good, bad], vec![]), dataset()),
            runner.run(EstimationRequest::new(vec![bad, good], vec![]), dataset()),
        ];

        // Assert
        for out in outcomes {
            match out {
                Err(RunnerError::DuplicateJob { key }) => assert_eq!(key, "GM"),
                other => panic!("expected DuplicateJob, got {other:?}"),
            }
        }
        assert_eq!(runner.current_generation(), 0);
    }

    #[test]
    // Purpose
    // -------
    // A blocking run starts a new generation like an asynchronous one.
    //
    // Given
    // -----
    // - An asynchronous GM batch followed by a blocking GM batch on the same
    //   runner.
    //
    // Expect
    // ------
    // - The blocking run returns one result; the earlier handle reports
    //   `Superseded { generation: 1 }`; the generation is 2.
    fn blocking_run_supersedes_pending_batch() {
        // Arrange
        let runner = EstimationRunner::new(EngineConfig::default()).unwrap();
        let ds = dataset();

        // Act
        let pending = runner.run(gm_request(), Arc::clone(&ds)).unwrap();
        let results = runner.run_blocking(&gm_request(), &ds).unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(runner.current_generation(), 2);
        assert!(matches!(pending.wait(), Err(RunnerError::Superseded { generation: 1 })));
    }

    #[test]
    // Purpose
    // -------
    // A newer batch supersedes an older one; the newest delivers.
    //
    // Given
    // -----
    // - Two batches started back to back on one runner.
    //
    // Expect
    // ------
    // - The first reports `Superseded { generation: 1 }`; the second
    //   delivers one converged GM result.
    fn newer_batch_supersedes_older() {
        // Arrange
        let runner = EstimationRunner::new(EngineConfig::default()).unwrap();
        let ds = dataset();

        // Act
        let first = runner.run(gm_request(), Arc::clone(&ds)).unwrap();
        let second = runner.run(gm_request(), ds).unwrap();

        // Assert
        assert!(first.is_superseded());
        assert!(matches!(first.wait(), Err(RunnerError::Superseded { generation: 1 })));
        assert_eq!(second.generation(), 2);
        let results = second.wait().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results.converged().count(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Callback delivery hands the results to the callback on the worker.
    //
    // Given
    // -----
    // - One GM batch with a callback storing the result count.
    //
    // Expect
    // ------
    // - `join` reports the callback ran; it saw one result.
    fn callback_receives_results() {
        // Arrange
        let runner = EstimationRunner::new(EngineConfig::default()).unwrap();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);

        // Act
        let handle = runner
            .run_with_callback(gm_request(), dataset(), move |results| {
                *sink.lock().unwrap() = Some(results.len());
            })
            .unwrap();

        // Assert
        assert!(handle.join().unwrap());
        assert_eq!(*seen.lock().unwrap(), Some(1));
    }

    #[test]
    // Purpose
    // -------
    // A panicking job becomes a failed result instead of unwinding.
    //
    // Given
    // -----
    // - `isolate` around a closure that panics with a message.
    //
    // Expect
    // ------
    // - A non-converged result with `FailureKind::Panic` and the message.
    fn panicking_job_is_isolated() {
        // Arrange
        let ds = dataset();
        let spec = ModelSpec::new(ModelKind::DiscreteWeibull3);

        // Act
        let fit = isolate(&spec, &[], &ds, || panic!("solver exploded"));

        // Assert
        assert!(!fit.converged);
        let failure = fit.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::Panic);
        assert!(failure.message.contains("solver exploded"));
        assert_eq!(fit.key, ResultKey::new("DW3", &[]));
    }

    #[test]
    // Purpose
    // -------
    // Parallel and sequential execution produce identical result sets, and
    // a malformed spec only fails its own job.
    //
    // Given
    // -----
    // - GM, IFRSB and an NB2 spec with a reversed range over both covariate
    //   selections, run blocking with `parallel` on and off.
    //
    // Expect
    // ------
    // - Equal result sets of 6 entries; both NB2 entries failed.
    fn parallel_and_sequential_agree() {
        // Arrange
        let ds = dataset();
        let request = EstimationRequest::all_combinations(
            vec![
                ModelSpec::new(ModelKind::Geometric),
                ModelSpec::new(ModelKind::IfrSalviaBollinger),
                ModelSpec::new(ModelKind::NegativeBinomial2)
                    .with_shape_range(ParamRange::new(0.5, 0.1)),
            ],
            &ds,
        );
        let parallel = EstimationRunner::new(EngineConfig::default()).unwrap();
        let sequential =
            EstimationRunner::new(EngineConfig { parallel: false, ..EngineConfig::default() })
                .unwrap();

        // Act
        let a = parallel.run_blocking(&request, &ds).unwrap();
        let b = sequential.run_blocking(&request, &ds).unwrap();

        // Assert
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.iter().filter(|(k, _)| k.model == "NB2").all(|(_, fit)| !fit.converged));
    }
}
