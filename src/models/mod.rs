pub mod author;
pub mod authorship;
pub mod metrics;
pub mod paper;

pub use author::{AuthorIdentity, AuthorProfile, MatchConfidence};
pub use authorship::{AuthorshipEdge, MatchTier};
pub use metrics::{
    AuthorMetrics, AuthorRanks, CareerStage, CollaborationMetrics, PotentialRating,
    RisingStarMetrics,
};
pub use paper::{ExternalAuthorRecord, Mention, PaperRecord, PaperStats};
