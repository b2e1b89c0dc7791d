use super::author::AuthorIdentity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMetrics {
    /// Sum of pairwise co-authorship frequencies.
    pub total_collaborations: u32,
    pub unique_collaborators: u32,
    pub avg_collaborators_per_paper: f64,
    /// unique_collaborators / paper_count, capped at 1.
    pub collaboration_ratio: f64,
    pub network_centrality: f64,
    pub collaboration_diversity_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerStage {
    Early,
    Mid,
    Senior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialRating {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RisingStarMetrics {
    pub recent_papers_count: u32,
    pub recent_citations_count: u64,
    pub recent_paper_ratio: f64,
    pub recent_citation_ratio: f64,
    pub citation_velocity: f64,
    pub impact_acceleration: f64,
    pub rising_star_score: f64,
    pub career_stage: CareerStage,
    pub potential_rating: PotentialRating,
}

/// Rank positions, each a permutation of 1..N over the population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRanks {
    pub productivity: u32,
    pub impact: u32,
    pub leadership: u32,
    pub collaboration: u32,
    pub overall: u32,
}

/// One row per `AuthorIdentity`, recomputed from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorMetrics {
    pub identity: AuthorIdentity,
    pub author_name: String,
    pub paper_count: u32,
    pub total_citations: u64,
    pub h_index: u32,
    pub highly_cited_papers: u32,
    pub top_cited_papers: u32,
    pub influential_citations: u64,
    pub impact_score: f64,
    pub leadership_score: f64,
    pub publications_per_year: f64,
    pub career_consistency_score: f64,
    pub collaboration: CollaborationMetrics,
    pub rising_star: RisingStarMetrics,
    pub overall_composite_score: f64,
    pub data_quality_score: f64,
    pub ranks: AuthorRanks,
}
