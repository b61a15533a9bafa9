use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use snapcatch::config::Config;
use snapcatch::constants::defaults;
use snapcatch::operations::reconcile::{reconcile, RunMode};
use snapcatch::services::{MiddlewareClient, ZfsCli};

#[tokio::main]
async fn main() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("snapcatch=info"));
    fmt().with_env_filter(env_filter).init();

    let mode = parse_mode();
    info!(
        "Starting snapshot task reconciliation ({} mode)",
        match mode {
            RunMode::Prune => "prune",
            RunMode::Report => "report-only",
        }
    );

    // Failures are signalled through the log only; the exit code stays 0
    // so the surrounding scheduling never treats a degraded run as fatal.
    if let Err(e) = run(mode).await {
        error!("Reconciliation aborted: {}", e);
    }
}

fn parse_mode() -> RunMode {
    match std::env::args().nth(1).as_deref() {
        Some("--prune") => RunMode::Prune,
        Some(other) => {
            warn!("Unrecognized argument '{}', running report-only", other);
            RunMode::Report
        }
        None => RunMode::Report,
    }
}

async fn run(mode: RunMode) -> Result<()> {
    let config = Config::load_or_default(defaults::CONFIG_PATH).await?;

    let middleware = MiddlewareClient::new(&config.middleware_bin);
    let zfs = ZfsCli::new(&config.zfs_bin);

    let report = reconcile(&middleware, &zfs, &config, mode).await;

    info!(
        "Run finished: {} tasks checked, {} fresh, {} triggered ({} failed), \
         {} unlinked snapshots, {} destroyed",
        report.tasks_checked,
        report.tasks_fresh,
        report.tasks_triggered,
        report.tasks_failed,
        report.unlinked.len(),
        report.destroyed
    );
    Ok(())
}
