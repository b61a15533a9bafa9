//! Client for the storage CLI (`zfs`)
//!
//! Snapshot listings are requested in machine-readable form (`-H -p`) and
//! already sorted newest-first by the CLI itself.

use anyhow::{anyhow, Result};
use tokio::process::Command as AsyncCommand;
use tracing::{debug, info};

use super::SnapshotStore;
use crate::types::Snapshot;

pub struct ZfsCli {
    binary: String,
}

impl ZfsCli {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!("zfs {}", args.join(" "));

        let output = AsyncCommand::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| anyhow!("Failed to invoke {}: {}", self.binary, e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if output.status.success() {
            Ok(stdout)
        } else {
            let error_msg = if !stderr.is_empty() { stderr } else { stdout };
            Err(anyhow!("zfs {} failed: {}", args.join(" "), error_msg.trim()))
        }
    }
}

impl SnapshotStore for ZfsCli {
    async fn list_snapshots(&self, dataset: &str, recursive: bool) -> Result<Vec<Snapshot>> {
        let depth_flag = if recursive { "-r" } else { "-d" };
        let mut args = vec![
            "list", "-H", "-p", "-t", "snapshot", "-o", "name,creation", "-S", "creation",
            depth_flag,
        ];
        if !recursive {
            args.push("1");
        }
        args.push(dataset);

        let raw = self.run(&args).await?;
        Ok(parse_snapshot_listing(&raw))
    }

    async fn destroy_snapshot(&self, name: &str) -> Result<()> {
        self.run(&["destroy", name]).await?;
        info!("Destroyed snapshot {}", name);
        Ok(())
    }
}

/// One `name<TAB>creation` pair per line. Lines that do not parse are
/// dropped rather than failing the whole listing.
fn parse_snapshot_listing(raw: &str) -> Vec<Snapshot> {
    raw.lines()
        .filter_map(|line| {
            let (name, creation) = line.split_once('\t')?;
            let creation = creation.trim().parse::<i64>().ok()?;
            Some(Snapshot {
                name: name.to_string(),
                creation,
            })
        })
        .collect()
}
