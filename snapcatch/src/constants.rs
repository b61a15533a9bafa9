//! Application-wide constants for polling, intervals, and default paths
//!
//! Single source of truth for the magic numbers the reconciler runs on.
//! Deployment-specific values live in `config`; these are the defaults.

use std::time::Duration;

/// Job polling constants
pub mod poll {
    use super::Duration;

    /// Spacing between job status polls after a task has been triggered
    pub const JOB_POLL_INTERVAL: Duration = Duration::from_secs(2);

    /// Maximum number of polls before a triggered task is written off
    /// (300 polls at 2s spacing ~ 10 minutes wall-clock)
    pub const MAX_JOB_POLLS: u32 = 300;
}

/// Inferred schedule intervals, in seconds
pub mod intervals {
    /// One minute
    pub const MINUTE: i64 = 60;

    /// One hour
    pub const HOUR: i64 = 3600;

    /// One day
    pub const DAY: i64 = 86400;

    /// One week
    pub const WEEK: i64 = 604800;

    /// Monthly cadence, treated as 30 days
    pub const MONTH: i64 = 2592000;
}

/// Default deployment paths and binaries
pub mod defaults {
    /// Root dataset collection that the reconciliation pass scans
    pub const ROOT_DATASET: &str = "tank";

    /// Applications dataset of the host platform, relative to the root
    /// collection. Never eligible for pruning.
    pub const APPS_DATASET: &str = "ix-applications";

    /// Host RPC client binary
    pub const MIDDLEWARE_BIN: &str = "midclt";

    /// Storage CLI binary
    pub const ZFS_BIN: &str = "zfs";

    /// Config file checked at startup
    pub const CONFIG_PATH: &str = "/etc/snapcatch.toml";
}
