//! Profile Aggregator: one `AuthorProfile` per resolved identity.

pub mod aggregate;
pub mod identity;

pub use aggregate::{aggregate_profiles, index_paper_stats, PaperStatsIndex, ProfileAggregation};
pub use identity::{canonical_primary_name, IdentityIndex};
