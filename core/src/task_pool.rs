use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::JobError;
use crate::shuffle::ShuffleStore;

/// Scheduling knobs shared by every stage
#[derive(Debug, Clone)]
pub struct TaskPoolConfig {
    /// Maximum attempts in flight at once
    pub workers: usize,
    /// Additional attempts allowed after the first failure
    pub retry_limit: u32,
    /// Time budget per attempt; an elapsed budget counts as a failure
    pub timeout: Duration,
}

/// Outcome of one completed stage
#[derive(Debug)]
pub struct TaskPoolRun<O> {
    /// One output per task, in task order
    pub outputs: Vec<O>,
    /// Attempts that failed and were rescheduled
    pub retries: u64,
}

struct AttemptResult<O> {
    task_id: usize,
    attempt: u32,
    result: Result<O, String>,
}

/// Runs every task to completion on a bounded pool of parallel attempts
///
/// Tasks are handed out like the teacher hands chunks to mappers: fill the
/// pool, then reassign as completions arrive. A failed or timed-out attempt
/// is re-run from its original input up to `retry_limit` extra times - safe
/// because stage functions are pure - after which the job fails naming the
/// offending task. Outputs publish to a write-once store on success only,
/// so a failed attempt's partial work is never visible downstream.
pub async fn run_task_pool<T, O, F>(
    stage: &'static str,
    tasks: Vec<T>,
    config: &TaskPoolConfig,
    cancel: &CancellationToken,
    task_fn: F,
) -> Result<TaskPoolRun<O>, JobError>
where
    T: Clone + Send + 'static,
    O: Send + 'static,
    F: Fn(usize, &T) -> Result<O, String> + Send + Sync + Clone + 'static,
{
    let total = tasks.len();
    if total == 0 {
        return Ok(TaskPoolRun {
            outputs: Vec::new(),
            retries: 0,
        });
    }

    let workers = config.workers.max(1);
    let (tx, mut rx) = mpsc::channel::<AttemptResult<O>>(total);

    let mut store = ShuffleStore::new(total);
    let mut pending: VecDeque<(usize, u32)> = (0..total).map(|id| (id, 0)).collect();
    let mut in_flight = 0usize;
    let mut retries = 0u64;

    loop {
        if cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        // Fill the pool
        while in_flight < workers {
            let Some((task_id, attempt)) = pending.pop_front() else {
                break;
            };
            spawn_attempt(
                task_id,
                attempt,
                tasks[task_id].clone(),
                config.timeout,
                task_fn.clone(),
                tx.clone(),
            );
            in_flight += 1;
        }

        if store.committed() == total {
            break;
        }

        let completion = tokio::select! {
            completion = rx.recv() => match completion {
                Some(completion) => completion,
                None => break,
            },
            _ = cancel.cancelled() => return Err(JobError::Cancelled),
        };
        in_flight -= 1;

        match completion.result {
            Ok(output) => {
                // A stale success from a superseded attempt is dropped here
                store.commit(completion.task_id, completion.attempt, output);
            }
            Err(reason) => {
                if completion.attempt >= config.retry_limit {
                    return Err(JobError::TaskFailed {
                        stage,
                        task_id: completion.task_id,
                        attempts: completion.attempt + 1,
                        reason,
                    });
                }
                warn!(
                    stage,
                    task_id = completion.task_id,
                    attempt = completion.attempt,
                    reason = %reason,
                    "task attempt failed, rescheduling"
                );
                retries += 1;
                pending.push_back((completion.task_id, completion.attempt + 1));
            }
        }
    }

    debug_assert!(store.is_complete());
    Ok(TaskPoolRun {
        outputs: store.into_outputs(),
        retries,
    })
}

fn spawn_attempt<T, O, F>(
    task_id: usize,
    attempt: u32,
    task: T,
    timeout: Duration,
    task_fn: F,
    tx: mpsc::Sender<AttemptResult<O>>,
) where
    T: Send + 'static,
    O: Send + 'static,
    F: Fn(usize, &T) -> Result<O, String> + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let compute = tokio::task::spawn_blocking(move || task_fn(task_id, &task));
        let result = match tokio::time::timeout(timeout, compute).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(format!("worker panicked: {join_error}")),
            Err(_) => Err("time budget exceeded".to_string()),
        };
        let _ = tx
            .send(AttemptResult {
                task_id,
                attempt,
                result,
            })
            .await;
    });
}
