mod config;
pub mod layout;

pub use config::{
    config_file_path, ensure_workspace_structure, load_or_default, save, workspace_root,
    AuthorshipSettings, EngineConfig, MatcherSettings, MetricsSettings, OrderPolicy,
    WorkspacePaths, CONFIG_FILE_NAME, HOME_ENV_VAR,
};
pub use layout::{
    RelationLayout, AUTHORSHIPS_FILE, EVENTS_FILE, METRICS_FILE, PAPERS_SUBDIR, PROFILES_FILE,
    RELATIONS_SUBDIR, RUNS_FILE,
};

use anyhow::Result;
use std::path::{Path, PathBuf};

/// An opened workspace: resolved paths plus the loaded configuration.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub config: EngineConfig,
    pub paths: WorkspacePaths,
    pub layout: RelationLayout,
    pub config_path: PathBuf,
}

impl Workspace {
    /// Opens the workspace at `AUTHORBASE_HOME` or the OS data directory.
    pub fn new() -> Result<Self> {
        Self::open_at(workspace_root()?)
    }

    /// Opens the workspace rooted at `root`, ignoring the environment.
    pub fn open_at(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let paths = ensure_workspace_structure(root)?;
        let config = load_or_default(root)?;
        let layout = RelationLayout::new(&paths);
        Ok(Self {
            config,
            config_path: config_file_path(root),
            layout,
            paths,
        })
    }

    pub fn root(&self) -> &Path {
        &self.paths.root
    }

    pub fn save_config(&self) -> Result<()> {
        save(&self.paths.root, &self.config)
    }
}
