//! The reconciliation pass
//!
//! One pass over everything: run every stale enabled task, then take a
//! census of all snapshots under the root collection and classify each one
//! as linked (its name carries some configured task's prefix) or unlinked.
//! Unlinked snapshots are destroyed in prune mode, reported otherwise.
//! No single failure aborts the pass; everything is isolated to the task or
//! snapshot it concerns.

use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::operations::catchup::{run_if_stale, PollSettings};
use crate::schedule::expected_interval;
use crate::services::{SnapshotStore, TaskControl};
use crate::types::{ReconcileReport, TaskOutcome};

/// What to do with unlinked snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Report,
    Prune,
}

pub async fn reconcile<C: TaskControl, S: SnapshotStore>(
    control: &C,
    store: &S,
    config: &Config,
    mode: RunMode,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let tasks = match control.query_tasks().await {
        Ok(tasks) => tasks,
        Err(e) => {
            error!("Task query failed, nothing to reconcile: {}", e);
            return report;
        }
    };
    info!("{} snapshot tasks configured", tasks.len());

    let now = Utc::now().timestamp();
    let poll = PollSettings {
        interval: Duration::from_secs(config.poll_interval_secs),
        max_polls: config.max_polls,
    };

    for task in &tasks {
        if !task.enabled {
            info!("Task {} ({}) is disabled, skipping", task.id, task.dataset);
            continue;
        }
        report.tasks_checked += 1;

        let interval = expected_interval(&task.schedule);
        match run_if_stale(control, store, task, interval, now, poll).await {
            TaskOutcome::Fresh => report.tasks_fresh += 1,
            TaskOutcome::Completed => report.tasks_triggered += 1,
            TaskOutcome::Failed | TaskOutcome::TimedOut | TaskOutcome::Unexpected => {
                report.tasks_triggered += 1;
                report.tasks_failed += 1;
            }
        }
    }

    // Census: every snapshot under the root collection, against the prefixes
    // of every configured task (disabled tasks still own their snapshots).
    let prefixes: Vec<String> = tasks
        .iter()
        .map(|task| task.name_prefix().to_string())
        .collect();

    let all_snapshots = match store.list_snapshots(&config.root_dataset, true).await {
        Ok(snapshots) => snapshots,
        Err(e) => {
            error!(
                "Recursive snapshot listing of {} failed: {}",
                config.root_dataset, e
            );
            Vec::new()
        }
    };
    report.total_recursive = all_snapshots.len();

    match store.list_snapshots(&config.root_dataset, false).await {
        Ok(snapshots) => report.total_root_only = snapshots.len(),
        Err(e) => warn!(
            "Root-only snapshot listing of {} failed: {}",
            config.root_dataset, e
        ),
    }

    for snap in &all_snapshots {
        if config.is_protected(snap.dataset()) {
            continue;
        }
        let linked_to = prefixes
            .iter()
            .find(|prefix| snap.name.contains(&format!("@{}", prefix)));
        match linked_to {
            Some(prefix) => {
                *report.linked_per_prefix.entry(prefix.clone()).or_insert(0) += 1;
            }
            None => report.unlinked.push(snap.name.clone()),
        }
    }

    if report.unlinked.is_empty() {
        info!("No unlinked snapshots under {}", config.root_dataset);
    } else {
        match mode {
            RunMode::Prune => {
                info!(
                    "Destroying {} unlinked snapshots under {}",
                    report.unlinked.len(),
                    config.root_dataset
                );
                for name in &report.unlinked {
                    // best-effort: a failed destroy must not stop the rest
                    match store.destroy_snapshot(name).await {
                        Ok(()) => report.destroyed += 1,
                        Err(e) => warn!("Failed to destroy {}: {}", name, e),
                    }
                }
            }
            RunMode::Report => {
                for name in &report.unlinked {
                    info!("Unlinked snapshot: {}", name);
                }
                info!(
                    "{} unlinked snapshots under {} (report-only, pass --prune to destroy)",
                    report.unlinked.len(),
                    config.root_dataset
                );
            }
        }
    }

    for (prefix, count) in &report.linked_per_prefix {
        info!("Prefix '{}': {} linked snapshots", prefix, count);
    }
    info!(
        "Snapshots under {}: {} recursive, {} on the root dataset itself",
        config.root_dataset, report.total_recursive, report.total_root_only
    );

    report
}
