//! Configuration primitives for the AuthorBase engine.
//!
//! Stored as TOML under the workspace root at `config/config.toml`. Every
//! section and field has a default, so a missing or partial file is valid.

use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the workspace root.
pub const HOME_ENV_VAR: &str = "AUTHORBASE_HOME";
/// Standard relative path to the config file inside the workspace.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Root configuration persisted per workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name matcher knobs (fuzzy acceptance threshold).
    #[serde(default)]
    pub matcher: MatcherSettings,
    /// Authorship builder options (order policy, parallelism, progress cadence).
    #[serde(default)]
    pub authorship: AuthorshipSettings,
    /// Bibliometric windows and citation thresholds.
    #[serde(default)]
    pub metrics: MetricsSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherSettings {
    /// Minimum combined similarity for a fuzzy match.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,
    /// Only pair initials when one side actually abbreviates a given name,
    /// so "John Smith" and "Jane Smith" stay apart.
    #[serde(default)]
    pub strict_initials: bool,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            strict_initials: false,
        }
    }
}

const fn default_fuzzy_threshold() -> f64 {
    0.85
}

/// How edge orders are assigned within a paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Orders follow the primary-source listing.
    #[default]
    Publication,
    /// Matched mentions first (in acceptance order), then unmatched ones.
    MatchedFirst,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorshipSettings {
    #[serde(default)]
    pub order_policy: OrderPolicy,
    /// Size of the rayon pool used for per-paper matching.
    #[serde(default = "default_max_parallel_papers")]
    pub max_parallel_papers: u32,
    /// Papers processed between progress log lines.
    #[serde(default = "default_progress_log_interval")]
    pub progress_log_interval: u32,
}

impl Default for AuthorshipSettings {
    fn default() -> Self {
        Self {
            order_policy: OrderPolicy::default(),
            max_parallel_papers: default_max_parallel_papers(),
            progress_log_interval: default_progress_log_interval(),
        }
    }
}

const fn default_max_parallel_papers() -> u32 {
    4
}

const fn default_progress_log_interval() -> u32 {
    5000
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSettings {
    /// Width of the "recent" window in years.
    #[serde(default = "default_recent_years")]
    pub recent_years: u32,
    /// Year the recent window is measured from. Defaults to the current UTC year.
    #[serde(default)]
    pub reference_year: Option<i32>,
    #[serde(default = "default_highly_cited_threshold")]
    pub highly_cited_threshold: u64,
    #[serde(default = "default_top_cited_threshold")]
    pub top_cited_threshold: u64,
}

impl MetricsSettings {
    pub fn resolved_reference_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(|| Utc::now().year())
    }

    /// Earliest publication year that counts as recent.
    pub fn recent_cutoff_year(&self) -> i32 {
        self.resolved_reference_year() - self.recent_years as i32
    }
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            recent_years: default_recent_years(),
            reference_year: None,
            highly_cited_threshold: default_highly_cited_threshold(),
            top_cited_threshold: default_top_cited_threshold(),
        }
    }
}

const fn default_recent_years() -> u32 {
    3
}

const fn default_highly_cited_threshold() -> u64 {
    50
}

const fn default_top_cited_threshold() -> u64 {
    100
}

/// Returns the root directory where AuthorBase stores data.
///
/// Order of precedence:
/// 1. `AUTHORBASE_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var(HOME_ENV_VAR) {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("AuthorBase"))
}

pub fn config_file_path(root: &Path) -> PathBuf {
    root.join("config").join(CONFIG_FILE_NAME)
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default(root: &Path) -> Result<EngineConfig> {
    let path = config_file_path(root);
    if path.exists() {
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        let cfg: EngineConfig = toml::from_str(&data)
            .with_context(|| format!("Failed to parse config file {:?}", path))?;
        Ok(cfg)
    } else {
        Ok(EngineConfig::default())
    }
}

/// Persists the configuration to disk.
pub fn save(root: &Path, config: &EngineConfig) -> Result<()> {
    let path = config_file_path(root);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let data = toml::to_string_pretty(config)?;
    fs::write(&path, data)?;
    Ok(())
}

/// Ensures the workspace structure exists (User/ and AI/ directories).
pub fn ensure_workspace_structure(root: &Path) -> Result<WorkspacePaths> {
    let paths = WorkspacePaths::new(root.to_path_buf());
    fs::create_dir_all(&paths.user_dir)
        .with_context(|| format!("Failed to create {:?}", paths.user_dir))?;
    fs::create_dir_all(&paths.ai_dir)
        .with_context(|| format!("Failed to create {:?}", paths.ai_dir))?;
    Ok(paths)
}

/// Convenience struct exposing important workspace paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePaths {
    pub root: PathBuf,
    /// Inputs owned by the user: paper relations and change sets.
    pub user_dir: PathBuf,
    /// Regenerable outputs: relations and run logs.
    pub ai_dir: PathBuf,
}

impl WorkspacePaths {
    pub fn new(root: PathBuf) -> Self {
        Self {
            user_dir: root.join("User"),
            ai_dir: root.join("AI"),
            root,
        }
    }
}
