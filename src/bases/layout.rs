//! Shared filesystem layout for engine inputs and outputs.
//!
//! Relations and run logs live in the AI layer because they are fully
//! regenerable; paper inputs and change sets live in the User layer.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use super::WorkspacePaths;

/// AI-layer subdirectory holding the materialized relations.
pub const RELATIONS_SUBDIR: &str = "relations";
/// User-layer subdirectory scanned for `*.jsonl` paper rows by default.
pub const PAPERS_SUBDIR: &str = "papers";
pub const AUTHORSHIPS_FILE: &str = "authorships.json";
pub const PROFILES_FILE: &str = "author_profiles.json";
pub const METRICS_FILE: &str = "author_metrics.json";
pub const EVENTS_FILE: &str = "events.jsonl";
pub const RUNS_FILE: &str = "runs.jsonl";

/// Every path the pipeline reads or writes for one workspace.
#[derive(Debug, Clone)]
pub struct RelationLayout {
    pub papers_dir: PathBuf,
    pub relations_dir: PathBuf,
    pub authorships_path: PathBuf,
    pub profiles_path: PathBuf,
    pub metrics_path: PathBuf,
    pub events_path: PathBuf,
    pub runs_path: PathBuf,
}

impl RelationLayout {
    pub fn new(paths: &WorkspacePaths) -> Self {
        let relations_dir = paths.ai_dir.join(RELATIONS_SUBDIR);
        Self {
            papers_dir: paths.user_dir.join(PAPERS_SUBDIR),
            authorships_path: relations_dir.join(AUTHORSHIPS_FILE),
            profiles_path: relations_dir.join(PROFILES_FILE),
            metrics_path: relations_dir.join(METRICS_FILE),
            events_path: paths.ai_dir.join(EVENTS_FILE),
            runs_path: paths.ai_dir.join(RUNS_FILE),
            relations_dir,
        }
    }

    /// Ensures the relations directory exists and returns its path.
    pub fn ensure_relations_dir(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.relations_dir)?;
        Ok(self.relations_dir.clone())
    }
}
