pub mod matcher;
pub mod normalize;
pub mod similarity;
pub mod stats;

pub use matcher::{match_authors, MatchOutcome, MatchedPair, NameMatcher, UnmatchedMention};
pub use normalize::{name_tokens, normalize_name};
pub use similarity::{combined_similarity, SimilarityBreakdown};
pub use stats::{MatchStats, MatchStatsSummary, TierStat};
