//! JSON persistence for the three output relations.
//!
//! Each relation is a single pretty-printed JSON array. Writes are staged to
//! sibling `.tmp` files and only renamed into place once every staged file
//! was written. The files being replaced are moved aside to `.bak` first and
//! put back if any rename fails, so a failed commit leaves the previous
//! relations intact.

use crate::bases::RelationLayout;
use crate::models::{AuthorMetrics, AuthorProfile, AuthorshipEdge};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// All three relations as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationSnapshot {
    pub edges: Vec<AuthorshipEdge>,
    pub profiles: Vec<AuthorProfile>,
    pub metrics: Vec<AuthorMetrics>,
}

/// SHA-256 of each committed relation file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationHashes {
    pub authorships: Option<String>,
    pub profiles: Option<String>,
    pub metrics: Option<String>,
}

pub struct RelationStore {
    layout: RelationLayout,
}

impl RelationStore {
    pub fn new(layout: RelationLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &RelationLayout {
        &self.layout
    }

    /// Previously committed edges; empty before the first run.
    pub fn load_edges(&self) -> Result<Vec<AuthorshipEdge>> {
        read_rows(&self.layout.authorships_path)
    }

    pub fn load_profiles(&self) -> Result<Vec<AuthorProfile>> {
        read_rows(&self.layout.profiles_path)
    }

    pub fn load_metrics(&self) -> Result<Vec<AuthorMetrics>> {
        read_rows(&self.layout.metrics_path)
    }

    pub fn load_snapshot(&self) -> Result<RelationSnapshot> {
        Ok(RelationSnapshot {
            edges: self.load_edges()?,
            profiles: self.load_profiles()?,
            metrics: self.load_metrics()?,
        })
    }

    /// Replaces all three relations.
    pub fn commit(&self, snapshot: &RelationSnapshot) -> Result<RelationHashes> {
        self.layout.ensure_relations_dir()?;
        let staged = vec![
            stage(&self.layout.authorships_path, &sorted_edges(&snapshot.edges))?,
            stage(&self.layout.profiles_path, &sorted_by_identity(&snapshot.profiles, |p| &p.identity))?,
            stage(&self.layout.metrics_path, &sorted_by_identity(&snapshot.metrics, |m| &m.identity))?,
        ];
        let mut hashes = publish(staged)?;
        Ok(RelationHashes {
            authorships: Some(hashes.remove(0)),
            profiles: Some(hashes.remove(0)),
            metrics: Some(hashes.remove(0)),
        })
    }
}

pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

pub fn hash_path(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Unable to open {} for hashing", path.display()))?;
    Ok(hash_bytes(&bytes))
}

struct StagedFile {
    tmp_path: PathBuf,
    final_path: PathBuf,
    hash: String,
}

fn stage<T: Serialize>(path: &Path, rows: &T) -> Result<StagedFile> {
    let data = serde_json::to_vec_pretty(rows)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, &data)
        .with_context(|| format!("Failed to stage relation {}", tmp_path.display()))?;
    Ok(StagedFile {
        tmp_path,
        final_path: path.to_path_buf(),
        hash: hash_bytes(&data),
    })
}

fn publish(staged: Vec<StagedFile>) -> Result<Vec<String>> {
    let mut backups: Vec<(PathBuf, PathBuf)> = Vec::new();
    for file in &staged {
        if file.final_path.exists() {
            let backup = file.final_path.with_extension("json.bak");
            if let Err(err) = fs::rename(&file.final_path, &backup) {
                restore(&[], &backups);
                return Err(err).with_context(|| {
                    format!("Failed to set aside relation {}", file.final_path.display())
                });
            }
            backups.push((backup, file.final_path.clone()));
        }
    }

    let mut published: Vec<&Path> = Vec::new();
    for file in &staged {
        if let Err(err) = fs::rename(&file.tmp_path, &file.final_path) {
            restore(&published, &backups);
            return Err(err).with_context(|| {
                format!("Failed to replace relation {}", file.final_path.display())
            });
        }
        published.push(&file.final_path);
    }

    for (backup, _) in &backups {
        if let Err(err) = fs::remove_file(backup) {
            warn!(path = %backup.display(), error = %err, "could not remove relation backup");
        }
    }
    Ok(staged.into_iter().map(|file| file.hash).collect())
}

/// Best effort: drop newly published files and move the backups back.
fn restore(published: &[&Path], backups: &[(PathBuf, PathBuf)]) {
    for path in published {
        let _ = fs::remove_file(path);
    }
    for (backup, original) in backups {
        if let Err(err) = fs::rename(backup, original) {
            warn!(path = %original.display(), error = %err, "could not restore relation");
        }
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let data = fs::read(path).with_context(|| format!("Failed to read relation {:?}", path))?;
    let rows = serde_json::from_slice(&data)
        .with_context(|| format!("Failed to parse relation {:?}", path))?;
    Ok(rows)
}

fn sorted_edges(edges: &[AuthorshipEdge]) -> Vec<&AuthorshipEdge> {
    let mut rows: Vec<&AuthorshipEdge> = edges.iter().collect();
    rows.sort_by(|a, b| a.paper_id.cmp(&b.paper_id).then(a.order.cmp(&b.order)));
    rows
}

fn sorted_by_identity<T, K: Ord>(rows: &[T], key: impl Fn(&T) -> &K) -> Vec<&T> {
    let mut sorted: Vec<&T> = rows.iter().collect();
    sorted.sort_by(|a, b| key(a).cmp(key(b)));
    sorted
}
