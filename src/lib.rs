pub mod authorship;
pub mod bases;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod orchestration;
pub mod profiles;
pub mod storage;

// Re-export commonly used types for convenience.
pub use bases::{EngineConfig, Workspace};
pub use matching::{match_authors, MatchOutcome, NameMatcher};
pub use models::{
    AuthorIdentity, AuthorMetrics, AuthorProfile, AuthorshipEdge, MatchTier, PaperRecord,
};
pub use orchestration::{CancelFlag, Pipeline, RunLog, RunSummary};
pub use storage::{ChangeSet, JsonlPaperSource, MemoryPaperSource, PaperSource, RelationStore};
