//! Persisted JSON audit record for each discovery run: the run record
//! plus an ordered event timeline, written once at finalization to
//! `{data_dir}/discovery-runs/{run_id}.json`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use prospect_common::DiscoveryRun;

pub struct RunLog {
    pub run_id: Uuid,
    events: Vec<RunEvent>,
    seq: u32,
}

#[derive(Serialize)]
struct RunEvent {
    seq: u32,
    ts: DateTime<Utc>,
    #[serde(flatten)]
    kind: EventKind,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    RunCreated {
        mode: String,
        dry_run: bool,
        intent: String,
    },
    BudgetCheck {
        remaining_ms: u64,
        expired: bool,
    },
    ChannelCompleted {
        channel: String,
        results: u32,
        error: Option<String>,
    },
    DedupeCompleted {
        before: u32,
        after: u32,
    },
    PersistCompleted {
        created: u32,
        skipped: u32,
        errors: u32,
    },
    RunFinalized {
        status: String,
        stopped_early: bool,
    },
}

impl RunLog {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            events: Vec::new(),
            seq: 0,
        }
    }

    pub fn log(&mut self, kind: EventKind) {
        self.events.push(RunEvent {
            seq: self.seq,
            ts: Utc::now(),
            kind,
        });
        self.seq += 1;
    }

    /// Write the run record and event timeline to disk. Returns the file
    /// path on success.
    pub fn save(&self, data_dir: &Path, run: &DiscoveryRun) -> Result<PathBuf> {
        let dir = data_dir.join("discovery-runs");
        std::fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.json", self.run_id));
        let output = SerializedRunLog {
            run,
            events: &self.events,
        };
        std::fs::write(&path, serde_json::to_string_pretty(&output)?)?;

        info!(path = %path.display(), events = self.events.len(), "Run log saved");
        Ok(path)
    }
}

#[derive(Serialize)]
struct SerializedRunLog<'a> {
    #[serde(flatten)]
    run: &'a DiscoveryRun,
    events: &'a [RunEvent],
}

#[cfg(test)]
mod tests {
    use super::*;
    use prospect_common::{RunMode, RunStatus};

    #[test]
    fn saved_log_contains_run_and_ordered_events() {
        let mut run = DiscoveryRun::new(true, RunMode::Test, "tests");
        run.transition(RunStatus::Running).unwrap();
        run.transition(RunStatus::Completed).unwrap();

        let mut log = RunLog::new(run.id);
        log.log(EventKind::RunCreated {
            mode: run.mode.to_string(),
            dry_run: true,
            intent: "digital-agencies".into(),
        });
        log.log(EventKind::DedupeCompleted { before: 4, after: 3 });
        log.log(EventKind::RunFinalized {
            status: run.status.to_string(),
            stopped_early: false,
        });

        let dir = tempfile::tempdir().unwrap();
        let path = log.save(dir.path(), &run).unwrap();

        let raw = std::fs::read_to_string(path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["status"], "completed");
        let events = value["events"].as_array().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0]["seq"], 0);
        assert_eq!(events[0]["type"], "run_created");
        assert_eq!(events[2]["type"], "run_finalized");
    }
}
