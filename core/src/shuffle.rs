use std::hash::{DefaultHasher, Hash, Hasher};

use crate::record::CompoundKey;

/// Stage-1 partition function: routes a compound key to one of
/// `partitions` aggregator tasks. Deterministic across runs and workers -
/// identical keys always land on the same task.
pub fn stage1_partition(key: &CompoundKey, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}

/// Stage-2 partition function: routes a group label to one of
/// `partitions` rank-reducer tasks
pub fn stage2_partition(label: &str, partitions: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    label.hash(&mut hasher);
    (hasher.finish() % partitions as u64) as usize
}

/// Write-once staging area for task outputs
///
/// Each task publishes at most one output, tagged with the attempt that
/// produced it. A failed attempt never reaches the store - its result is
/// dropped with the completion message - and a late duplicate from a
/// superseded attempt is rejected, so retries can never double-count.
#[derive(Debug)]
pub struct ShuffleStore<T> {
    slots: Vec<Option<Committed<T>>>,
}

#[derive(Debug)]
struct Committed<T> {
    attempt: u32,
    output: T,
}

impl<T> ShuffleStore<T> {
    pub fn new(tasks: usize) -> Self {
        let mut slots = Vec::with_capacity(tasks);
        slots.resize_with(tasks, || None);
        Self { slots }
    }

    /// Publishes a successful attempt's output
    /// Returns `false` when the task already committed (stale attempt)
    pub fn commit(&mut self, task_id: usize, attempt: u32, output: T) -> bool {
        let slot = &mut self.slots[task_id];
        if slot.is_some() {
            return false;
        }
        *slot = Some(Committed { attempt, output });
        true
    }

    /// True once every task has published - the stage barrier condition
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn committed(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Attempt number that published a task's output, if any
    pub fn committed_attempt(&self, task_id: usize) -> Option<u32> {
        self.slots[task_id].as_ref().map(|slot| slot.attempt)
    }

    /// Consumes the store, yielding outputs in task order
    /// Must only be called once `is_complete` holds
    pub fn into_outputs(self) -> Vec<T> {
        self.slots
            .into_iter()
            .map(|slot| slot.expect("shuffle store drained before barrier").output)
            .collect()
    }
}
