//! Scripted fakes for driving the operations without a live host
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{anyhow, Result};

use snapcatch::services::{SnapshotStore, TaskControl};
use snapcatch::types::{JobState, Snapshot, SnapshotTask, TaskSchedule, TriggerReply};

pub fn task(id: i64, dataset: &str, schema: &str, enabled: bool) -> SnapshotTask {
    task_with_schedule(id, dataset, schema, enabled, ("0", "0", "*", "*"))
}

pub fn task_with_schedule(
    id: i64,
    dataset: &str,
    schema: &str,
    enabled: bool,
    (minute, hour, dom, dow): (&str, &str, &str, &str),
) -> SnapshotTask {
    SnapshotTask {
        id,
        dataset: dataset.to_string(),
        naming_schema: schema.to_string(),
        enabled,
        schedule: TaskSchedule {
            minute: minute.to_string(),
            hour: hour.to_string(),
            dom: dom.to_string(),
            dow: dow.to_string(),
        },
    }
}

pub fn snap(name: &str, creation: i64) -> Snapshot {
    Snapshot {
        name: name.to_string(),
        creation,
    }
}

/// One scripted reply of the job-state query.
pub enum PollScript {
    State(Option<JobState>),
    Error,
}

/// Middleware fake: fixed task list, fixed run-task reply, scripted job
/// state sequence. Once the script runs out the job reports RUNNING forever.
pub struct ScriptedControl {
    pub tasks: Vec<SnapshotTask>,
    pub reply: TriggerReply,
    pub fail_query: bool,
    pub fail_run: bool,
    job_script: Mutex<VecDeque<PollScript>>,
    run_calls: Mutex<Vec<i64>>,
    poll_count: Mutex<u32>,
}

impl ScriptedControl {
    pub fn new(tasks: Vec<SnapshotTask>, reply: TriggerReply) -> Self {
        Self {
            tasks,
            reply,
            fail_query: false,
            fail_run: false,
            job_script: Mutex::new(VecDeque::new()),
            run_calls: Mutex::new(Vec::new()),
            poll_count: Mutex::new(0),
        }
    }

    pub fn with_job_script(self, script: Vec<PollScript>) -> Self {
        *self.job_script.lock().unwrap() = script.into_iter().collect();
        self
    }

    pub fn run_calls(&self) -> Vec<i64> {
        self.run_calls.lock().unwrap().clone()
    }

    pub fn polls(&self) -> u32 {
        *self.poll_count.lock().unwrap()
    }
}

impl TaskControl for ScriptedControl {
    async fn query_tasks(&self) -> Result<Vec<SnapshotTask>> {
        if self.fail_query {
            return Err(anyhow!("middleware unreachable"));
        }
        Ok(self.tasks.clone())
    }

    async fn run_task(&self, task_id: i64) -> Result<TriggerReply> {
        if self.fail_run {
            return Err(anyhow!("middleware unreachable"));
        }
        self.run_calls.lock().unwrap().push(task_id);
        Ok(self.reply.clone())
    }

    async fn job_state(&self, _job_id: i64) -> Result<Option<JobState>> {
        *self.poll_count.lock().unwrap() += 1;
        match self.job_script.lock().unwrap().pop_front() {
            Some(PollScript::State(state)) => Ok(state),
            Some(PollScript::Error) => Err(anyhow!("middleware hiccup")),
            None => Ok(Some(JobState::Running)),
        }
    }
}

/// Storage fake: listings keyed by dataset, destroys recorded, individual
/// destroy failures scriptable by name.
pub struct FakeStore {
    pub root_only: HashMap<String, Vec<Snapshot>>,
    pub recursive: HashMap<String, Vec<Snapshot>>,
    pub fail_list: bool,
    pub fail_destroy: Vec<String>,
    destroyed: Mutex<Vec<String>>,
}

impl FakeStore {
    pub fn empty() -> Self {
        Self {
            root_only: HashMap::new(),
            recursive: HashMap::new(),
            fail_list: false,
            fail_destroy: Vec::new(),
            destroyed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_root_only(mut self, dataset: &str, snapshots: Vec<Snapshot>) -> Self {
        self.root_only.insert(dataset.to_string(), snapshots);
        self
    }

    pub fn with_recursive(mut self, dataset: &str, snapshots: Vec<Snapshot>) -> Self {
        self.recursive.insert(dataset.to_string(), snapshots);
        self
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl SnapshotStore for FakeStore {
    async fn list_snapshots(&self, dataset: &str, recursive: bool) -> Result<Vec<Snapshot>> {
        if self.fail_list {
            return Err(anyhow!("cannot open '{}': dataset does not exist", dataset));
        }
        let table = if recursive {
            &self.recursive
        } else {
            &self.root_only
        };
        Ok(table.get(dataset).cloned().unwrap_or_default())
    }

    async fn destroy_snapshot(&self, name: &str) -> Result<()> {
        if self.fail_destroy.iter().any(|n| n == name) {
            return Err(anyhow!("cannot destroy '{}': dataset is busy", name));
        }
        self.destroyed.lock().unwrap().push(name.to_string());
        Ok(())
    }
}
