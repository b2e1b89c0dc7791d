//! Read-only access to the paper-keyed input relation.

use crate::authorship::PaperIssue;
use crate::models::PaperRecord;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Rows loaded from a source plus rows that could not be read.
#[derive(Debug, Clone, Default)]
pub struct PaperBatch {
    pub papers: Vec<PaperRecord>,
    pub issues: Vec<PaperIssue>,
}

/// A batch query over the papers the engine should consider.
///
/// An `Err` means the input as a whole is unavailable, which aborts the run.
/// Individual bad rows belong in `PaperBatch::issues`.
pub trait PaperSource {
    fn load_papers(&self) -> Result<PaperBatch>;

    fn describe(&self) -> String;
}

/// Papers kept in memory, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryPaperSource {
    papers: Vec<PaperRecord>,
}

impl MemoryPaperSource {
    pub fn new(papers: Vec<PaperRecord>) -> Self {
        Self { papers }
    }

    pub fn push(&mut self, paper: PaperRecord) {
        self.papers.push(paper);
    }

    /// Replaces the row with the same paper id, or appends it.
    pub fn upsert(&mut self, paper: PaperRecord) {
        match self
            .papers
            .iter_mut()
            .find(|existing| existing.paper_id == paper.paper_id)
        {
            Some(existing) => *existing = paper,
            None => self.papers.push(paper),
        }
    }

    pub fn remove(&mut self, paper_id: &str) {
        self.papers.retain(|paper| paper.paper_id != paper_id);
    }
}

impl PaperSource for MemoryPaperSource {
    fn load_papers(&self) -> Result<PaperBatch> {
        Ok(PaperBatch {
            papers: self.papers.clone(),
            issues: Vec::new(),
        })
    }

    fn describe(&self) -> String {
        format!("memory ({} papers)", self.papers.len())
    }
}

/// Newline-delimited JSON paper rows under a directory (or a single file).
///
/// Files are read in sorted path order so row order, and therefore duplicate
/// resolution, is stable between runs.
#[derive(Debug, Clone)]
pub struct JsonlPaperSource {
    root: PathBuf,
}

impl JsonlPaperSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `*.jsonl` files under the root, following symlinks. Entries the walk
    /// cannot read are reported as issues instead of being skipped quietly.
    fn files(&self) -> (Vec<PathBuf>, Vec<PaperIssue>) {
        let mut files = Vec::new();
        let mut issues = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_jsonl(entry.path()) {
                        files.push(entry.into_path());
                    }
                }
                Err(err) => {
                    let location = err
                        .path()
                        .map(|path| self.label(path))
                        .unwrap_or_else(|| self.root.display().to_string());
                    warn!(%location, error = %err, "unreadable input entry");
                    issues.push(PaperIssue::unparseable(location, err.to_string()));
                }
            }
        }
        files.sort();
        (files, issues)
    }

    fn label(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .unwrap_or(path)
            .to_string_lossy()
            .to_string()
    }
}

impl PaperSource for JsonlPaperSource {
    fn load_papers(&self) -> Result<PaperBatch> {
        if !self.root.exists() {
            anyhow::bail!("Paper input {:?} does not exist", self.root);
        }
        let (files, walk_issues) = self.files();
        let mut batch = PaperBatch {
            issues: walk_issues,
            ..PaperBatch::default()
        };
        for path in files {
            let data = fs::read(&path)
                .with_context(|| format!("Failed to read paper rows from {:?}", path))?;
            let label = self.label(&path);
            let mut rows = 0usize;
            for (idx, raw) in data.split(|byte| *byte == b'\n').enumerate() {
                let location = || format!("{}:{}", label, idx + 1);
                let line = match std::str::from_utf8(raw) {
                    Ok(line) => line.strip_suffix('\r').unwrap_or(line),
                    Err(err) => {
                        let location = location();
                        warn!(%location, error = %err, "paper row is not valid UTF-8");
                        batch
                            .issues
                            .push(PaperIssue::unparseable(location, err.to_string()));
                        continue;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<PaperRecord>(line) {
                    Ok(paper) => {
                        rows += 1;
                        batch.papers.push(paper);
                    }
                    Err(err) => {
                        let location = location();
                        warn!(%location, error = %err, "unparseable paper row");
                        batch
                            .issues
                            .push(PaperIssue::unparseable(location, err.to_string()));
                    }
                }
            }
            debug!(file = %label, rows, "loaded paper rows");
        }
        Ok(batch)
    }

    fn describe(&self) -> String {
        format!("jsonl {}", self.root.display())
    }
}

fn is_jsonl(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()).map(|s| s.to_lowercase()),
        Some(ref ext) if ext == "jsonl"
    )
}
