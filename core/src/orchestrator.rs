use std::collections::HashMap;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::aggregate::PartialAggregate;
use crate::config::JobConfig;
use crate::error::JobError;
use crate::mapper::{run_map_task, MapOutput, MapShard};
use crate::output::{write_job_result, JobResult};
use crate::ranker::{rank_group, GroupRanking};
use crate::record::CompoundKey;
use crate::shuffle::{stage1_partition, stage2_partition};
use crate::task_pool::run_task_pool;

/// Run-level counters surfaced when a job completes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobSummary {
    /// Lines accepted as records
    pub records: u64,
    /// Lines rejected by the parser
    pub parse_errors: u64,
    /// Groups present in the output
    pub groups: u64,
    /// Task attempts that failed and were re-run, across all stages
    pub task_retries: u64,
}

/// Stage-1 reduce assignment: every shuffled pair routed to one partition
#[derive(Debug, Clone)]
struct AggregateTask {
    partition: usize,
    pairs: Arc<[(CompoundKey, PartialAggregate)]>,
}

/// Merged per-key aggregates produced by one stage-1 partition
#[derive(Debug)]
struct AggregateOutput {
    partition: usize,
    merged: Vec<(CompoundKey, PartialAggregate)>,
}

/// Stage-2 assignment: the complete aggregate sets for a subset of groups
#[derive(Debug, Clone)]
struct RankTask {
    groups: Arc<[(String, Vec<(usize, PartialAggregate)>)]>,
}

/// Drives the whole job: sharding, the map pool, the shuffle and barrier
/// into stage-1 aggregation, the barrier into stage-2 ranking, and final
/// assembly in first-appearance order
pub struct Orchestrator {
    config: JobConfig,
    cancel: CancellationToken,
}

impl Orchestrator {
    pub fn new(config: JobConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token for external shutdown (Ctrl+C in the CLI)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Reads the input file, executes the pipeline and publishes the
    /// output artifact
    pub async fn run(&self) -> Result<JobSummary, JobError> {
        let text = tokio::fs::read_to_string(&self.config.input_path).await?;
        let lines: Vec<String> = text.lines().map(String::from).collect();

        let (result, summary) = self.execute(lines).await?;

        write_job_result(&self.config.output_path, &result)?;
        info!(
            records = summary.records,
            parse_errors = summary.parse_errors,
            groups = summary.groups,
            task_retries = summary.task_retries,
            "job complete"
        );
        Ok(summary)
    }

    /// Executes the two-stage pipeline over in-memory lines
    pub async fn execute(&self, lines: Vec<String>) -> Result<(JobResult, JobSummary), JobError> {
        self.config.validate()?;

        let pool = self.config.pool_config();
        let partitions = self.config.workers;

        // MAP PHASE
        let shards = make_shards(lines, self.config.shard_size);
        info!(
            shards = shards.len(),
            workers = pool.workers,
            "map phase starting"
        );
        let expected_dims = self.config.expected_dims;
        let map_run = run_task_pool("map", shards, &pool, &self.cancel, move |_, shard| {
            Ok(run_map_task(shard, expected_dims))
        })
        .await?;

        let mut summary = JobSummary {
            task_retries: map_run.retries,
            ..JobSummary::default()
        };
        let first_seen = collect_counters(&map_run.outputs, &mut summary);
        info!(
            records = summary.records,
            parse_errors = summary.parse_errors,
            "map phase complete"
        );

        // SHUFFLE + STAGE-1 REDUCE
        let aggregate_tasks = build_aggregate_tasks(map_run.outputs, partitions);
        let aggregate_run = run_task_pool(
            "aggregate",
            aggregate_tasks,
            &pool,
            &self.cancel,
            |_, task| Ok(run_aggregate_task(task)),
        )
        .await?;
        summary.task_retries += aggregate_run.retries;

        // Barrier reached: every partition has published. Re-key by group,
        // verifying each compound key arrived from exactly one partition.
        let groups = regroup_by_label(aggregate_run.outputs)?;
        info!(groups = groups.len(), "aggregate phase complete");

        // STAGE-2 REDUCE (ranking)
        let rank_tasks = build_rank_tasks(groups, partitions);
        let top_k = self.config.top_k;
        let decimals = self.config.decimals;
        let rank_run = run_task_pool("rank", rank_tasks, &pool, &self.cancel, move |_, task| {
            Ok(run_rank_task(task, top_k, decimals))
        })
        .await?;
        summary.task_retries += rank_run.retries;

        let result = assemble(rank_run.outputs, first_seen, &mut summary);
        info!(groups = summary.groups, "rank phase complete");
        Ok((result, summary))
    }
}

/// Splits input lines into contiguous shards, each remembering the global
/// index of its first line
fn make_shards(lines: Vec<String>, shard_size: usize) -> Vec<MapShard> {
    let mut shards = Vec::new();
    let mut buffer: Vec<String> = Vec::new();
    let mut base_index = 0u64;

    for (index, line) in lines.into_iter().enumerate() {
        if buffer.is_empty() {
            base_index = index as u64;
        }
        buffer.push(line);
        if buffer.len() == shard_size {
            shards.push(MapShard {
                shard_id: shards.len(),
                base_index,
                lines: std::mem::take(&mut buffer).into(),
            });
        }
    }
    if !buffer.is_empty() {
        shards.push(MapShard {
            shard_id: shards.len(),
            base_index,
            lines: buffer.into(),
        });
    }
    shards
}

/// Folds record/parse-error counters and merges per-label first-appearance
/// indexes across map outputs
fn collect_counters(outputs: &[MapOutput], summary: &mut JobSummary) -> HashMap<String, u64> {
    let mut first_seen: HashMap<String, u64> = HashMap::new();
    for output in outputs {
        summary.records += output.records;
        summary.parse_errors += output.parse_errors;
        for (label, &index) in &output.first_seen {
            first_seen
                .entry(label.clone())
                .and_modify(|seen| *seen = (*seen).min(index))
                .or_insert(index);
        }
    }
    first_seen
}

/// The stage-1 shuffle: routes every (key, partial) pair produced by any
/// mapper to the single partition responsible for that key
fn build_aggregate_tasks(outputs: Vec<MapOutput>, partitions: usize) -> Vec<AggregateTask> {
    let mut buckets: Vec<Vec<(CompoundKey, PartialAggregate)>> = vec![Vec::new(); partitions];
    for output in outputs {
        for (key, partial) in output.partials {
            let partition = stage1_partition(&key, partitions);
            buckets[partition].push((key, partial));
        }
    }

    buckets
        .into_iter()
        .enumerate()
        .filter(|(_, pairs)| !pairs.is_empty())
        .map(|(partition, pairs)| AggregateTask {
            partition,
            pairs: pairs.into(),
        })
        .collect()
}

/// Stage-1 reduce: merges all pairs sharing a compound key
/// Pure and associative, so any arrival order and any retry is safe
fn run_aggregate_task(task: &AggregateTask) -> AggregateOutput {
    let mut merged: HashMap<CompoundKey, PartialAggregate> = HashMap::new();
    for (key, partial) in task.pairs.iter() {
        merged.entry(key.clone()).or_default().merge(*partial);
    }
    AggregateOutput {
        partition: task.partition,
        merged: merged.into_iter().collect(),
    }
}

/// Re-keys stage-1 output by group label for the ranking stage
/// A compound key seen from two different partitions is a routing bug
fn regroup_by_label(
    outputs: Vec<AggregateOutput>,
) -> Result<HashMap<String, Vec<(usize, PartialAggregate)>>, JobError> {
    let mut origin: HashMap<CompoundKey, usize> = HashMap::new();
    let mut groups: HashMap<String, Vec<(usize, PartialAggregate)>> = HashMap::new();

    for output in outputs {
        for (key, partial) in output.merged {
            if let Some(&previous) = origin.get(&key) {
                if previous != output.partition {
                    return Err(JobError::ShuffleRouting {
                        label: key.label,
                        dimension: key.dimension,
                    });
                }
            }
            origin.insert(key.clone(), output.partition);
            groups
                .entry(key.label)
                .or_default()
                .push((key.dimension, partial));
        }
    }
    Ok(groups)
}

/// The stage-2 shuffle: partitions whole groups across rank tasks
fn build_rank_tasks(
    groups: HashMap<String, Vec<(usize, PartialAggregate)>>,
    partitions: usize,
) -> Vec<RankTask> {
    let mut buckets: Vec<Vec<(String, Vec<(usize, PartialAggregate)>)>> =
        vec![Vec::new(); partitions];
    for (label, aggregates) in groups {
        let partition = stage2_partition(&label, partitions);
        buckets[partition].push((label, aggregates));
    }

    buckets
        .into_iter()
        .filter(|bucket| !bucket.is_empty())
        .map(|bucket| RankTask {
            groups: bucket.into(),
        })
        .collect()
}

/// Stage-2 reduce: ranks each assigned group
fn run_rank_task(task: &RankTask, top_k: usize, decimals: u32) -> Vec<GroupRanking> {
    task.groups
        .iter()
        .map(|(label, aggregates)| {
            rank_group(label.clone(), aggregates.clone(), top_k, decimals)
        })
        .collect()
}

/// Assembles the final result with groups ordered by the global index of
/// their first appearance in the input
fn assemble(
    outputs: Vec<Vec<GroupRanking>>,
    first_seen: HashMap<String, u64>,
    summary: &mut JobSummary,
) -> JobResult {
    let mut rankings: HashMap<String, GroupRanking> = outputs
        .into_iter()
        .flatten()
        .map(|ranking| (ranking.label.clone(), ranking))
        .collect();

    let mut order: Vec<(String, u64)> = first_seen.into_iter().collect();
    order.sort_by_key(|&(_, index)| index);

    let mut result = JobResult::default();
    for (label, _) in order {
        if let Some(ranking) = rankings.remove(&label) {
            summary.groups += 1;
            result.push_group(ranking);
        }
    }
    result
}
