pub mod change_set;
pub mod relations;
pub mod source;
pub mod verify;

pub use change_set::ChangeSet;
pub use relations::{
    hash_bytes, hash_path, RelationHashes, RelationSnapshot, RelationStore,
};
pub use source::{JsonlPaperSource, MemoryPaperSource, PaperBatch, PaperSource};
pub use verify::{verify_snapshot, Violation};
