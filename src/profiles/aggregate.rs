use super::identity::{canonical_primary_name, IdentityIndex};
use crate::bases::MetricsSettings;
use crate::models::{
    AuthorIdentity, AuthorProfile, AuthorshipEdge, MatchConfidence, PaperRecord, PaperStats,
};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Paper statistics keyed by paper id.
pub type PaperStatsIndex = HashMap<String, PaperStats>;

/// Indexes paper statistics; the first row for an id wins, matching the
/// authorship builder's duplicate handling.
pub fn index_paper_stats(papers: &[PaperRecord]) -> PaperStatsIndex {
    let mut index = PaperStatsIndex::with_capacity(papers.len());
    for paper in papers {
        index.entry(paper.paper_id.clone()).or_insert(paper.stats);
    }
    index
}

#[derive(Debug, Clone, Default)]
pub struct ProfileAggregation {
    /// One row per identity, sorted by identity.
    pub profiles: Vec<AuthorProfile>,
    pub identities: IdentityIndex,
    /// Edges whose paper lacked a citation count or year (or had no stats row).
    pub aggregation_gaps: usize,
}

impl ProfileAggregation {
    pub fn profile(&self, identity: &AuthorIdentity) -> Option<&AuthorProfile> {
        self.profiles
            .binary_search_by(|p| p.identity.cmp(identity))
            .ok()
            .map(|idx| &self.profiles[idx])
    }
}

/// Collapses the full edge set into one profile per identity.
///
/// Pure over its inputs: the same edges and stats always give identical rows.
pub fn aggregate_profiles(
    edges: &[AuthorshipEdge],
    stats: &PaperStatsIndex,
    settings: &MetricsSettings,
) -> ProfileAggregation {
    let identities = IdentityIndex::build(edges);
    let groups: Vec<(AuthorIdentity, Vec<&AuthorshipEdge>)> =
        identities.group(edges).into_iter().collect();
    let last_orders = last_order_by_paper(edges);
    let cutoff = settings.recent_cutoff_year();

    let built: Vec<(AuthorProfile, usize)> = groups
        .into_par_iter()
        .map(|(identity, group)| build_profile(identity, &group, stats, &last_orders, cutoff))
        .collect();

    let aggregation_gaps: usize = built.iter().map(|(_, gaps)| gaps).sum();
    let profiles: Vec<AuthorProfile> = built.into_iter().map(|(profile, _)| profile).collect();
    info!(
        profiles = profiles.len(),
        edges = edges.len(),
        aggregation_gaps,
        "aggregated author profiles"
    );
    ProfileAggregation {
        profiles,
        identities,
        aggregation_gaps,
    }
}

pub(crate) fn last_order_by_paper(edges: &[AuthorshipEdge]) -> HashMap<&str, usize> {
    let mut last: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        let slot = last.entry(edge.paper_id.as_str()).or_insert(0);
        *slot = (*slot).max(edge.order);
    }
    last
}

fn build_profile(
    identity: AuthorIdentity,
    edges: &[&AuthorshipEdge],
    stats: &PaperStatsIndex,
    last_orders: &HashMap<&str, usize>,
    recent_cutoff: i32,
) -> (AuthorProfile, usize) {
    let paper_count = edges.len() as u32;
    let mut gaps = 0usize;
    let mut total_citations = 0u64;
    let mut total_influential = 0u64;
    let mut first_year: Option<i32> = None;
    let mut latest_year: Option<i32> = None;
    let mut first_author_count = 0u32;
    let mut last_author_count = 0u32;
    let mut recent_count = 0u32;
    let mut primary_names = BTreeSet::new();
    let mut external_names = BTreeSet::new();

    for edge in edges {
        primary_names.insert(canonical_primary_name(&edge.primary_name));
        if let Some(name) = &edge.external_name {
            external_names.insert(name.clone());
        }

        let paper = stats.get(&edge.paper_id).copied();
        let citations = paper.and_then(|s| s.citation_count);
        let year = paper.and_then(|s| s.year);
        if citations.is_none() || year.is_none() {
            gaps += 1;
            debug!(paper_id = %edge.paper_id, identity = %identity, "paper statistics incomplete");
        }
        total_citations += citations.unwrap_or(0);
        total_influential += paper.and_then(|s| s.influential_citation_count).unwrap_or(0);
        if let Some(year) = year {
            first_year = Some(first_year.map_or(year, |y| y.min(year)));
            latest_year = Some(latest_year.map_or(year, |y| y.max(year)));
            if year >= recent_cutoff {
                recent_count += 1;
            }
        }

        let is_first = edge.order == 1;
        let is_last = last_orders.get(edge.paper_id.as_str()) == Some(&edge.order);
        if is_first {
            first_author_count += 1;
        }
        if is_last {
            last_author_count += 1;
        }
    }

    // solo papers count as both first and last, so the difference can dip below zero
    let middle_author_count = paper_count.saturating_sub(first_author_count + last_author_count);

    let career_length = match (first_year, latest_year) {
        (Some(first), Some(latest)) => (latest - first + 1).max(0) as u32,
        _ => 0,
    };
    let first_author_ratio = ratio(first_author_count as f64, paper_count);
    let last_author_ratio = ratio(last_author_count as f64, paper_count);
    let has_external_id = identity.has_external_id();
    let completeness_factors = [
        has_external_id,
        paper_count > 0,
        total_citations > 0,
        career_length > 0,
    ];
    let data_completeness_score = completeness_factors.iter().filter(|f| **f).count() as f64
        / completeness_factors.len() as f64;

    let profile = AuthorProfile {
        primary_names: primary_names.into_iter().collect(),
        external_names: external_names.into_iter().collect(),
        paper_count,
        total_citations,
        total_influential_citations: total_influential,
        avg_citations: ratio(total_citations as f64, paper_count),
        first_publication_year: first_year,
        latest_publication_year: latest_year,
        career_length,
        first_author_count,
        last_author_count,
        middle_author_count,
        first_author_ratio,
        last_author_ratio,
        contribution_score: 0.4 * first_author_ratio + 0.6 * last_author_ratio,
        rising_star_score: ratio(recent_count as f64, paper_count),
        data_completeness_score,
        match_confidence: if has_external_id {
            MatchConfidence::High
        } else {
            MatchConfidence::Low
        },
        identity,
    };
    (profile, gaps)
}

fn ratio(value: f64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        value / count as f64
    }
}
