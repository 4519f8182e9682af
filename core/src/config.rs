use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::JobError;
use crate::task_pool::TaskPoolConfig;

/// Job configuration
///
/// Every tunable has a default so a config file may set only what it needs;
/// the CLI applies flag overrides on top. The top-K and precision defaults
/// match the downstream dashboard's expectations but are not fixed behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    #[serde(default)]
    pub input_path: PathBuf,
    #[serde(default)]
    pub output_path: PathBuf,

    /// Ranked dimensions emitted per group
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Parallel task attempts in flight per stage
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Input lines per map shard
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,
    /// Decimal places kept in emitted means
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Extra attempts allowed per task after its first failure
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Per-attempt time budget in seconds
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
    /// When set, records must carry exactly this many readings
    #[serde(default)]
    pub expected_dims: Option<usize>,
}

fn default_top_k() -> usize {
    13
}

fn default_workers() -> usize {
    4
}

fn default_shard_size() -> usize {
    10_000
}

fn default_decimals() -> u32 {
    3
}

fn default_retry_limit() -> u32 {
    3
}

fn default_task_timeout_secs() -> u64 {
    60
}

impl JobConfig {
    pub fn new(input_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            input_path,
            output_path,
            top_k: default_top_k(),
            workers: default_workers(),
            shard_size: default_shard_size(),
            decimals: default_decimals(),
            retry_limit: default_retry_limit(),
            task_timeout_secs: default_task_timeout_secs(),
            expected_dims: None,
        }
    }

    /// Loads tunables from a JSON file; paths still come from the caller
    pub fn load(path: &Path, input_path: PathBuf, output_path: PathBuf) -> Result<Self, JobError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| JobError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config: JobConfig = serde_json::from_str(&contents)
            .map_err(|e| JobError::Config(format!("invalid config {}: {e}", path.display())))?;
        config.input_path = input_path;
        config.output_path = output_path;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), JobError> {
        if self.shard_size == 0 {
            return Err(JobError::Config("shard_size must be positive".into()));
        }
        if self.workers == 0 {
            return Err(JobError::Config("workers must be positive".into()));
        }
        if self.top_k == 0 {
            return Err(JobError::Config("top_k must be positive".into()));
        }
        Ok(())
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn pool_config(&self) -> TaskPoolConfig {
        TaskPoolConfig {
            workers: self.workers,
            retry_limit: self.retry_limit,
            timeout: self.task_timeout(),
        }
    }
}
