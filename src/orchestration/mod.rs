pub mod cancel;
pub mod pipeline;
pub mod summary;

pub use cancel::CancelFlag;
pub use pipeline::Pipeline;
pub use summary::{RunMode, RunStatus, RunSummary};

use crate::bases::RelationLayout;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Type of run events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEventType {
    RunStarted,
    AuthorshipsBuilt,
    ProfilesRebuilt,
    MetricsRebuilt,
    RunCompleted,
    RunCancelled,
    RunFailed,
}

/// Pipeline event stored as JSONL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub event_id: Uuid,
    pub run_id: Uuid,
    pub event_type: RunEventType,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl RunEvent {
    pub fn new(run_id: Uuid, event_type: RunEventType, details: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            run_id,
            event_type,
            timestamp: Utc::now(),
            details,
        }
    }
}

/// Wraps the append-only run logs of a workspace.
#[derive(Debug, Clone)]
pub struct RunLog {
    events_path: PathBuf,
    runs_path: PathBuf,
}

impl RunLog {
    pub fn for_layout(layout: &RelationLayout) -> Self {
        Self {
            events_path: layout.events_path.clone(),
            runs_path: layout.runs_path.clone(),
        }
    }

    pub fn append_event(&self, event: &RunEvent) -> Result<()> {
        append_line(&self.events_path, event)
    }

    pub fn record_run(&self, summary: &RunSummary) -> Result<()> {
        append_line(&self.runs_path, summary)
    }

    pub fn load_events(&self) -> Result<Vec<RunEvent>> {
        read_lines(&self.events_path)
    }

    pub fn load_events_for(&self, run_id: Uuid) -> Result<Vec<RunEvent>> {
        Ok(self
            .load_events()?
            .into_iter()
            .filter(|event| event.run_id == run_id)
            .collect())
    }

    pub fn load_runs(&self) -> Result<Vec<RunSummary>> {
        read_lines(&self.runs_path)
    }

    pub fn last_run(&self) -> Result<Option<RunSummary>> {
        Ok(self.load_runs()?.pop())
    }
}

fn append_line<T: Serialize>(path: &Path, row: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open run log {:?}", path))?;
    file.write_all(serde_json::to_string(row)?.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}

fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in data.lines().filter(|l| !l.trim().is_empty()) {
        let row: T = serde_json::from_str(line)?;
        rows.push(row);
    }
    Ok(rows)
}
