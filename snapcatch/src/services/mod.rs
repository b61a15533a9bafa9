//! Thin clients over the host's pre-existing tools
//!
//! The reconciler itself never touches storage directly; everything goes
//! through the middleware RPC client and the storage CLI. The two traits
//! below are the seam the operations are driven through, so tests can swap
//! in scripted fakes.

pub mod middleware;
pub mod zfs;

pub use middleware::MiddlewareClient;
pub use zfs::ZfsCli;

use anyhow::Result;

use crate::types::{JobState, Snapshot, SnapshotTask, TriggerReply};

/// Task configuration and job control on the host middleware.
#[allow(async_fn_in_trait)]
pub trait TaskControl {
    /// All configured snapshot tasks, one query.
    async fn query_tasks(&self) -> Result<Vec<SnapshotTask>>;

    /// Trigger a task by id. The reply shape varies; see [`TriggerReply`].
    async fn run_task(&self, task_id: i64) -> Result<TriggerReply>;

    /// State of a middleware job, or `None` when the job record has been
    /// purged already.
    async fn job_state(&self, job_id: i64) -> Result<Option<JobState>>;
}

/// Snapshot listing and destruction on the storage layer.
#[allow(async_fn_in_trait)]
pub trait SnapshotStore {
    /// Snapshots of `dataset`, optionally recursing into children.
    async fn list_snapshots(&self, dataset: &str, recursive: bool) -> Result<Vec<Snapshot>>;

    /// Destroy one snapshot by fully qualified name.
    async fn destroy_snapshot(&self, name: &str) -> Result<()>;
}
