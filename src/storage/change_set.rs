use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Paper ids that are new or changed since the last successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub paper_ids: BTreeSet<String>,
}

impl ChangeSet {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paper_ids: ids
                .into_iter()
                .map(Into::into)
                .map(|id: String| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    /// Reads `{"paper_ids": [...]}`. A missing or unreadable file is an error;
    /// an incremental run cannot proceed without its change set.
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read change set {:?}", path))?;
        let raw: ChangeSet = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse change set {:?}", path))?;
        Ok(Self::new(raw.paper_ids))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)
            .with_context(|| format!("Failed to write change set {:?}", path))?;
        Ok(())
    }

    pub fn contains(&self, paper_id: &str) -> bool {
        self.paper_ids.contains(paper_id)
    }

    pub fn len(&self) -> usize {
        self.paper_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paper_ids.is_empty()
    }
}
