use std::{error::Error, path::PathBuf, process, sync::Arc};

use clap::Parser;
use log::info;

use srgm_fit::{
    data::FailureDataSet,
    estimation::{EngineConfig, FitResult},
    models::{ModelKind, ModelSpec},
    runner::{Criterion, EstimationRequest, EstimationResultSet, EstimationRunner},
};

#[derive(Parser)]
#[command(
    name = "srgm-fit",
    about = "Fit covariate software reliability growth models to failure data",
    long_about = "Fits discrete SRGMs (GM, NB2, DW2, DW3, IFRSB) with optional covariates to a CSV \
                  table of interval failure data and prints a model comparison table."
)]
struct Cli {
    /// CSV with a time column, a Cumulative/CFC or FC column, and covariates
    data: PathBuf,

    /// Model short codes to fit (default: all)
    #[arg(long, value_delimiter = ',', value_name = "CODE")]
    models: Vec<String>,

    /// Covariate combination to fit, comma separated; repeat for more
    #[arg(long = "metrics", value_name = "NAMES", conflicts_with = "all_metrics")]
    metrics: Vec<String>,

    /// Fit every subset of the covariate columns
    #[arg(long)]
    all_metrics: bool,

    /// Engine configuration file (.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run jobs one after another instead of in parallel
    #[arg(long)]
    sequential: bool,

    /// Ranking criterion: aic, bic, sse or llf
    #[arg(long, default_value = "aic")]
    criterion: Criterion,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if cli.sequential {
        config.parallel = false;
    }

    let dataset = Arc::new(FailureDataSet::from_csv_path(&cli.data)?);
    info!(
        "loaded {} intervals, {} failures, covariates: [{}]",
        dataset.n_intervals(),
        dataset.total_failures(),
        dataset.metric_names().join(", ")
    );

    let kinds = if cli.models.is_empty() {
        ModelKind::ALL.to_vec()
    } else {
        cli.models.iter().map(|code| code.parse()).collect::<Result<Vec<ModelKind>, _>>()?
    };
    let models: Vec<ModelSpec> = kinds.into_iter().map(|kind| config.spec_for(kind)).collect();

    let request = if cli.all_metrics {
        EstimationRequest::all_combinations(models, &dataset)
    } else {
        let selections: Vec<Vec<String>> = cli
            .metrics
            .iter()
            .map(|group| {
                group.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
            })
            .collect();
        EstimationRequest::new(models, selections)
    };

    let runner = EstimationRunner::new(config)?;
    let results = runner.run(request, dataset)?.wait()?;
    print_table(&results, cli.criterion);
    Ok(())
}

fn print_table(results: &EstimationResultSet, criterion: Criterion) {
    println!(
        "{:<24} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "model", "b", "omega", "LLF", "AIC", "BIC", "SSE"
    );
    for fit in results.ranked_by(criterion) {
        println!("{}", row(fit));
    }
    for fit in results.failed() {
        let reason = fit.failure().map_or_else(String::new, |f| f.to_string());
        println!("{:<24} not converged: {reason}", fit.key.to_string());
    }
    println!(
        "ranked by {criterion}; {} of {} fits converged",
        results.converged().count(),
        results.len()
    );
}

fn row(fit: &FitResult) -> String {
    let num = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    format!(
        "{:<24} {:>10} {:>12} {:>12} {:>12} {:>12} {:>12}",
        fit.key.to_string(),
        fit.parameters().map_or_else(|| "-".to_string(), |p| format!("{:.6}", p.b)),
        num(fit.omega()),
        num(fit.llf_val()),
        num(fit.aic_val()),
        num(fit.bic_val()),
        num(fit.sse_val()),
    )
}
