use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use feature_rank_core::{JobConfig, Orchestrator};

/// Computes per-group per-dimension means over a labeled vector dataset
/// and reports the top-K dimensions by mean for each group
#[derive(Debug, Parser)]
#[command(name = "feature-rank", version)]
struct Cli {
    /// Input dataset (newline-delimited, comma-separated records)
    input: PathBuf,

    /// Output artifact path
    output: PathBuf,

    /// JSON file with tunables; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ranked dimensions emitted per group
    #[arg(long)]
    top_k: Option<usize>,

    /// Parallel worker tasks per stage
    #[arg(long)]
    workers: Option<usize>,

    /// Input lines per map shard
    #[arg(long)]
    shard_size: Option<usize>,

    /// Decimal places kept in emitted means
    #[arg(long)]
    decimals: Option<u32>,

    /// Extra attempts allowed per task after its first failure
    #[arg(long)]
    retry_limit: Option<u32>,

    /// Per-attempt time budget in seconds
    #[arg(long)]
    task_timeout: Option<u64>,

    /// Require exactly this many readings per record
    #[arg(long)]
    dims: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<JobConfig, feature_rank_core::JobError> {
        let mut config = match &self.config {
            Some(path) => JobConfig::load(path, self.input.clone(), self.output.clone())?,
            None => JobConfig::new(self.input.clone(), self.output.clone()),
        };

        if let Some(top_k) = self.top_k {
            config.top_k = top_k;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(shard_size) = self.shard_size {
            config.shard_size = shard_size;
        }
        if let Some(decimals) = self.decimals {
            config.decimals = decimals;
        }
        if let Some(retry_limit) = self.retry_limit {
            config.retry_limit = retry_limit;
        }
        if let Some(task_timeout) = self.task_timeout {
            config.task_timeout_secs = task_timeout;
        }
        if let Some(dims) = self.dims {
            config.expected_dims = Some(dims);
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let output_path = config.output_path.clone();

    let orchestrator = Orchestrator::new(config);

    // Ctrl+C cancels the run; in-flight tasks are abandoned and no partial
    // artifact is published
    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    match orchestrator.run().await {
        Ok(summary) => {
            println!(
                "records: {}  parse errors: {}  groups: {}  task retries: {}",
                summary.records, summary.parse_errors, summary.groups, summary.task_retries
            );
            println!("wrote {}", output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("job failed: {e}");
            ExitCode::FAILURE
        }
    }
}
