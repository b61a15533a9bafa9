use serde::Deserialize;
use std::collections::HashMap;

// === TASK CONFIGURATION (externally owned, read-only) ===

/// Cron-like schedule attached to a snapshot task. Each field is `*`, a step
/// expression `*/N`, or a fixed value.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSchedule {
    pub minute: String,
    pub hour: String,
    pub dom: String,
    pub dow: String,
}

/// A configured periodic snapshot task as reported by the host middleware.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotTask {
    pub id: i64,
    pub dataset: String,
    pub naming_schema: String,
    pub enabled: bool,
    pub schedule: TaskSchedule,
}

impl SnapshotTask {
    /// Literal prefix of the naming schema, i.e. everything before the first
    /// strftime placeholder. This prefix ties the task to the snapshots it
    /// has produced.
    pub fn name_prefix(&self) -> &str {
        match self.naming_schema.find('%') {
            Some(idx) => &self.naming_schema[..idx],
            None => &self.naming_schema,
        }
    }
}

// === SNAPSHOTS ===

/// A snapshot on disk: fully qualified `dataset@name` plus creation epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub creation: i64,
}

impl Snapshot {
    /// Dataset part of the fully qualified name.
    pub fn dataset(&self) -> &str {
        match self.name.find('@') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }
}

// === JOBS ===

/// State vocabulary of middleware jobs. The middleware may grow new states;
/// anything unrecognized lands in `Unknown` and keeps the poll loop going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobState {
    Waiting,
    Running,
    Success,
    Failed,
    Aborted,
    #[serde(other)]
    Unknown,
}

/// Reply shape of the middleware run-task call. The call returns nothing for
/// tasks that complete synchronously, a job id for asynchronous ones, and
/// occasionally something else entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReply {
    /// Task completed synchronously
    Completed,
    /// Task queued as a middleware job
    Pending(i64),
    /// Reply did not match any known shape; raw text kept for the log
    Unexpected(String),
}

impl TriggerReply {
    /// Classify the raw run-task output.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return TriggerReply::Completed;
        }
        match trimmed.parse::<i64>() {
            Ok(job_id) => TriggerReply::Pending(job_id),
            Err(_) => TriggerReply::Unexpected(trimmed.to_string()),
        }
    }
}

/// Terminal state of one task's trip through the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Last snapshot is younger than the expected interval; nothing done
    Fresh,
    /// Task ran to completion (or its job record was already purged)
    Completed,
    /// Job ended FAILED or ABORTED; not retried this run
    Failed,
    /// Poll budget exhausted while the job was still running
    TimedOut,
    /// Run call failed or replied with an unrecognized shape
    Unexpected,
}

// === RECONCILIATION REPORT ===

/// Aggregate counters for one reconciliation run.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub tasks_checked: usize,
    pub tasks_fresh: usize,
    pub tasks_triggered: usize,
    pub tasks_failed: usize,
    /// Linked snapshot count per task prefix
    pub linked_per_prefix: HashMap<String, usize>,
    /// Snapshots found under the root collection, recursive
    pub total_recursive: usize,
    /// Snapshots directly on the root collection dataset
    pub total_root_only: usize,
    /// Fully qualified names of snapshots matching no configured prefix
    pub unlinked: Vec<String>,
    /// Unlinked snapshots actually destroyed (prune mode only)
    pub destroyed: usize,
}
