use std::collections::HashMap;
use std::sync::Arc;

use crate::aggregate::PartialAggregate;
use crate::record::{parse_record, CompoundKey, RawRecord};

/// Map work assignment: a contiguous slice of input lines
///
/// `base_index` is the global index of the first line, so first-appearance
/// order of groups stays deterministic under any sharding. Lines are shared
/// behind an `Arc` because a retried attempt re-reads the same shard.
#[derive(Debug, Clone)]
pub struct MapShard {
    pub shard_id: usize,
    pub base_index: u64,
    pub lines: Arc<[String]>,
}

/// Combined output of one map task over one shard
#[derive(Debug, Clone, Default)]
pub struct MapOutput {
    /// In-mapper combined partials, one per compound key seen in the shard
    pub partials: HashMap<CompoundKey, PartialAggregate>,
    /// Smallest global line index at which each label appeared
    pub first_seen: HashMap<String, u64>,
    /// Lines rejected by the parser
    pub parse_errors: u64,
    /// Lines accepted as records
    pub records: u64,
}

/// Pure per-record map function: one (key, single-observation aggregate)
/// pair per dimension. Stateless and side-effect free, so a retried task
/// can re-execute it without correctness risk.
pub fn map_record(record: &RawRecord) -> impl Iterator<Item = (CompoundKey, PartialAggregate)> + '_ {
    record
        .readings
        .iter()
        .enumerate()
        .map(|(dimension, &value)| {
            (
                CompoundKey {
                    label: record.label.clone(),
                    dimension,
                },
                PartialAggregate::observation(value),
            )
        })
}

/// Runs the parser and mapper over one shard, folding emissions into
/// per-key partials as they are produced (in-mapper combining)
pub fn run_map_task(shard: &MapShard, expected_dims: Option<usize>) -> MapOutput {
    let mut output = MapOutput::default();

    for (offset, line) in shard.lines.iter().enumerate() {
        let index = shard.base_index + offset as u64;

        let record = match parse_record(line, expected_dims) {
            Ok(record) => record,
            Err(_) => {
                output.parse_errors += 1;
                continue;
            }
        };

        output.records += 1;
        output
            .first_seen
            .entry(record.label.clone())
            .and_modify(|seen| *seen = (*seen).min(index))
            .or_insert(index);

        for (key, observation) in map_record(&record) {
            output.partials.entry(key).or_default().merge(observation);
        }
    }

    output
}
