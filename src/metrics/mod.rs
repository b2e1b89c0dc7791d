//! Metrics & Ranking Engine.
//!
//! Recomputed from scratch over the full edge set on every run, because rank
//! positions only mean something relative to the whole population.

pub mod collaboration;
pub mod hindex;
pub mod ranking;
pub mod rising_star;

pub use collaboration::CollaborationGraph;
pub use hindex::{count_at_least, h_index};
pub use ranking::{
    assign_ranks, impact_score, overall_composite_score, ranking_order, RankAxis,
};
pub use rising_star::{career_stage, potential_rating, rising_star_metrics};

use crate::bases::MetricsSettings;
use crate::models::{
    AuthorIdentity, AuthorMetrics, AuthorProfile, AuthorRanks, AuthorshipEdge, PaperStats,
};
use crate::profiles::{PaperStatsIndex, ProfileAggregation};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// One metrics row per profile, ranked, sorted by identity.
pub fn compute_metrics(
    aggregation: &ProfileAggregation,
    edges: &[AuthorshipEdge],
    stats: &PaperStatsIndex,
    settings: &MetricsSettings,
) -> Vec<AuthorMetrics> {
    let graph = CollaborationGraph::build(edges, &aggregation.identities);
    let papers_by_identity = distinct_papers(aggregation, edges);

    let mut rows: Vec<AuthorMetrics> = aggregation
        .profiles
        .par_iter()
        .map(|profile| {
            let papers: Vec<PaperStats> = papers_by_identity
                .get(&profile.identity)
                .map(|ids| {
                    ids.iter()
                        .map(|id| stats.get(*id).copied().unwrap_or_default())
                        .collect()
                })
                .unwrap_or_default();
            metrics_for_profile(profile, &papers, &graph, settings)
        })
        .collect();

    assign_ranks(&mut rows);
    info!(authors = rows.len(), "computed author metrics and ranks");
    rows
}

/// Unranked metrics for one identity from its distinct papers' statistics.
pub fn metrics_for_profile(
    profile: &AuthorProfile,
    papers: &[PaperStats],
    graph: &CollaborationGraph,
    settings: &MetricsSettings,
) -> AuthorMetrics {
    let citations: Vec<u64> = papers.iter().filter_map(|p| p.citation_count).collect();
    let h = h_index(&citations);
    let highly_cited_papers = count_at_least(&citations, settings.highly_cited_threshold);
    let top_cited_papers = count_at_least(&citations, settings.top_cited_threshold);
    let impact = impact_score(profile.total_citations, h, highly_cited_papers);
    let leadership = profile.contribution_score;
    let publications_per_year = profile.paper_count as f64 / profile.career_length.max(1) as f64;
    let collaboration = graph.metrics_for(&profile.identity, profile.paper_count);
    let rising_star = rising_star_metrics(papers, profile.career_length, settings);
    let overall = overall_composite_score(
        profile.paper_count,
        impact,
        leadership,
        collaboration.collaboration_ratio,
        rising_star.rising_star_score,
    );

    AuthorMetrics {
        identity: profile.identity.clone(),
        author_name: profile.display_name().to_string(),
        paper_count: profile.paper_count,
        total_citations: profile.total_citations,
        h_index: h,
        highly_cited_papers,
        top_cited_papers,
        influential_citations: profile.total_influential_citations,
        impact_score: impact,
        leadership_score: leadership,
        publications_per_year,
        career_consistency_score: (publications_per_year / 2.0).min(1.0),
        collaboration,
        rising_star,
        overall_composite_score: overall,
        data_quality_score: if profile.identity.has_external_id() {
            1.0
        } else {
            0.5
        },
        ranks: AuthorRanks::default(),
    }
}

fn distinct_papers<'e>(
    aggregation: &ProfileAggregation,
    edges: &'e [AuthorshipEdge],
) -> BTreeMap<AuthorIdentity, BTreeSet<&'e str>> {
    let mut papers: BTreeMap<AuthorIdentity, BTreeSet<&str>> = BTreeMap::new();
    for edge in edges {
        papers
            .entry(aggregation.identities.identity_for(edge))
            .or_default()
            .insert(edge.paper_id.as_str());
    }
    papers
}
