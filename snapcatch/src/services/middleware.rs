//! Client for the host middleware RPC CLI (`midclt`)
//!
//! All task configuration and job state lives in the middleware; this is a
//! thin wrapper invoking its CLI and parsing the JSON it prints.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use serde_json::json;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use super::TaskControl;
use crate::types::{JobState, SnapshotTask, TriggerReply};

pub struct MiddlewareClient {
    binary: String,
}

impl MiddlewareClient {
    pub fn new(binary: &str) -> Self {
        Self {
            binary: binary.to_string(),
        }
    }

    async fn call(&self, method: &str, args: &[String]) -> Result<String> {
        debug!("middleware call: {} {:?}", method, args);

        let output = AsyncCommand::new(&self.binary)
            .arg("call")
            .arg(method)
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
            Err(anyhow!("{} failed: {}", method, error_msg.trim()))
        }
    }
}

impl TaskControl for MiddlewareClient {
    async fn query_tasks(&self) -> Result<Vec<SnapshotTask>> {
        let raw = self.call("pool.snapshottask.query", &[]).await?;
        parse_task_rows(&raw)
    }

    async fn run_task(&self, task_id: i64) -> Result<TriggerReply> {
        let raw = self
            .call("pool.snapshottask.run", &[task_id.to_string()])
            .await?;
        Ok(TriggerReply::parse(&raw))
    }

    async fn job_state(&self, job_id: i64) -> Result<Option<JobState>> {
        let filter = json!([["id", "=", job_id]]).to_string();
        let raw = self.call("core.get_jobs", &[filter]).await?;
        parse_job_state(&raw)
    }
}

fn parse_task_rows(raw: &str) -> Result<Vec<SnapshotTask>> {
    serde_json::from_str(raw).map_err(|e| anyhow!("Bad task query reply: {}", e))
}

#[derive(Deserialize)]
struct JobRow {
    state: JobState,
}

/// An empty result set means the job record has expired; the middleware
/// purges finished jobs after a while.
fn parse_job_state(raw: &str) -> Result<Option<JobState>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let rows: Vec<JobRow> =
        serde_json::from_str(trimmed).map_err(|e| anyhow!("Bad job query reply: {}", e))?;
    Ok(rows.first().map(|row| row.state))
}
