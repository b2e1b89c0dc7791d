use authorbase::bases::Workspace;
use authorbase::models::PaperRecord;
use authorbase::orchestration::Pipeline;
use authorbase::storage::{hash_path, JsonlPaperSource, RelationStore};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fixed so recency windows do not drift with the calendar.
pub const REFERENCE_YEAR: i32 = 2024;

pub struct IntegrationHarness {
    workspace: TempDir,
}

impl IntegrationHarness {
    pub fn new() -> Self {
        let workspace = TempDir::new().expect("failed to create temp workspace");
        let harness = Self { workspace };
        let mut opened = harness.workspace();
        opened.config.metrics.reference_year = Some(REFERENCE_YEAR);
        opened.save_config().expect("failed to write test config");
        harness
    }

    pub fn workspace_path(&self) -> &Path {
        self.workspace.path()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::open_at(self.workspace.path()).expect("failed to open test workspace")
    }

    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(&self.workspace())
    }

    pub fn store(&self) -> RelationStore {
        RelationStore::new(self.workspace().layout)
    }

    pub fn papers_dir(&self) -> PathBuf {
        self.workspace().layout.papers_dir
    }

    pub fn source(&self) -> JsonlPaperSource {
        JsonlPaperSource::new(self.papers_dir())
    }

    /// Replaces `file_name` under the papers directory with these rows.
    pub fn write_papers(&self, file_name: &str, papers: &[PaperRecord]) -> PathBuf {
        let lines: Vec<String> = papers
            .iter()
            .map(|paper| serde_json::to_string(paper).expect("paper rows serialize"))
            .collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.write_raw_rows(file_name, &refs)
    }

    pub fn write_raw_rows(&self, file_name: &str, lines: &[&str]) -> PathBuf {
        let dir = self.papers_dir();
        fs::create_dir_all(&dir).expect("failed to create papers dir");
        let path = dir.join(file_name);
        let mut file = fs::File::create(&path).expect("failed to create papers file");
        for line in lines {
            writeln!(file, "{line}").expect("failed to write paper row");
        }
        path
    }

    /// Current hashes of the three relation files, `None` where absent.
    pub fn relation_hashes(&self) -> [Option<String>; 3] {
        let layout = self.workspace().layout;
        [
            &layout.authorships_path,
            &layout.profiles_path,
            &layout.metrics_path,
        ]
        .map(|path| {
            path.exists()
                .then(|| hash_path(path).expect("relation file hashes"))
        })
    }
}

mod fatal_runs;
mod idempotence;
mod incremental_runs;
mod jsonl_source;
mod matching_properties;
mod pipeline_full;
