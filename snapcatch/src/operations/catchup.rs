//! Staleness check and run-and-await for a single snapshot task
//!
//! A task is stale when its newest matching snapshot is older than the
//! interval inferred from its schedule. Stale tasks are triggered through
//! the middleware; asynchronous runs are awaited with a bounded poll loop.
//! A task that fails or times out is left alone until the next invocation
//! of the whole reconciliation, which re-evaluates staleness and retries
//! naturally.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::services::{SnapshotStore, TaskControl};
use crate::types::{JobState, SnapshotTask, TaskOutcome, TriggerReply};

/// Pacing of the job poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_polls: u32,
}

/// Creation epoch of the newest snapshot of `dataset` (not recursing into
/// children) whose name contains `@<prefix>`. Returns 0 when nothing matches
/// or the listing fails: zero is infinitely stale, so the owning task is
/// guaranteed to be triggered.
pub async fn latest_snapshot_epoch<S: SnapshotStore>(
    store: &S,
    dataset: &str,
    prefix: &str,
) -> i64 {
    let marker = format!("@{}", prefix);
    match store.list_snapshots(dataset, false).await {
        Ok(snapshots) => snapshots
            .iter()
            .filter(|snap| snap.name.contains(&marker))
            .map(|snap| snap.creation)
            .max()
            .unwrap_or(0),
        Err(e) => {
            warn!("Snapshot listing for {} failed: {}", dataset, e);
            0
        }
    }
}

/// Judge staleness against `now` and, if stale, run the task and await the
/// result. Fresh tasks cause no side effect at all.
pub async fn run_if_stale<C: TaskControl, S: SnapshotStore>(
    control: &C,
    store: &S,
    task: &SnapshotTask,
    interval: i64,
    now: i64,
    poll: PollSettings,
) -> TaskOutcome {
    let prefix = task.name_prefix();
    let last = latest_snapshot_epoch(store, &task.dataset, prefix).await;
    let age = now - last;

    if age < interval {
        info!(
            "Task {} ({}@{}) is fresh: age {}s, interval {}s",
            task.id, task.dataset, prefix, age, interval
        );
        return TaskOutcome::Fresh;
    }

    info!(
        "Task {} ({}@{}) is stale: age {}s >= interval {}s, running it",
        task.id, task.dataset, prefix, age, interval
    );

    match control.run_task(task.id).await {
        Ok(TriggerReply::Completed) => {
            info!("Task {} completed synchronously", task.id);
            TaskOutcome::Completed
        }
        Ok(TriggerReply::Pending(job_id)) => await_job(control, task.id, job_id, poll).await,
        Ok(TriggerReply::Unexpected(raw)) => {
            error!("Task {} run replied with unexpected value: {}", task.id, raw);
            TaskOutcome::Unexpected
        }
        Err(e) => {
            error!("Task {} run call failed: {}", task.id, e);
            TaskOutcome::Unexpected
        }
    }
}

/// Bounded poll loop for an asynchronous task run. The middleware purges
/// finished job records after a while, so a job that vanished is taken to
/// have completed.
async fn await_job<C: TaskControl>(
    control: &C,
    task_id: i64,
    job_id: i64,
    poll: PollSettings,
) -> TaskOutcome {
    info!(
        "Task {} queued as job {}, polling every {:?} (budget {} polls)",
        task_id, job_id, poll.interval, poll.max_polls
    );

    for _ in 0..poll.max_polls {
        sleep(poll.interval).await;

        match control.job_state(job_id).await {
            Ok(Some(JobState::Success)) => {
                info!("Job {} for task {} succeeded", job_id, task_id);
                return TaskOutcome::Completed;
            }
            Ok(Some(state @ (JobState::Failed | JobState::Aborted))) => {
                error!("Job {} for task {} ended {:?}", job_id, task_id, state);
                return TaskOutcome::Failed;
            }
            Ok(None) => {
                info!(
                    "Job {} for task {} already purged, assuming it completed",
                    job_id, task_id
                );
                return TaskOutcome::Completed;
            }
            Ok(Some(_)) => {
                // still waiting or running, keep polling
            }
            Err(e) => {
                warn!("Job {} status check failed: {}", job_id, e);
            }
        }
    }

    error!(
        "Job {} for task {} not finished after {} polls, giving up on it",
        job_id, task_id, poll.max_polls
    );
    TaskOutcome::TimedOut
}
