//! Composite scores and population-wide rank assignment.
//!
//! Every axis sorts the population by score descending and hands out row
//! numbers 1..N. Exactly equal scores are ordered by `AuthorIdentity`, so
//! ranks are a permutation and reproducible run to run.

use crate::models::{AuthorIdentity, AuthorMetrics, AuthorRanks};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankAxis {
    Productivity,
    Impact,
    Leadership,
    Collaboration,
    Overall,
}

impl RankAxis {
    pub const ALL: [RankAxis; 5] = [
        RankAxis::Productivity,
        RankAxis::Impact,
        RankAxis::Leadership,
        RankAxis::Collaboration,
        RankAxis::Overall,
    ];

    pub fn score(&self, metrics: &AuthorMetrics) -> f64 {
        match self {
            RankAxis::Productivity => metrics.paper_count as f64,
            RankAxis::Impact => metrics.impact_score,
            RankAxis::Leadership => metrics.leadership_score,
            RankAxis::Collaboration => metrics.collaboration.collaboration_ratio,
            RankAxis::Overall => metrics.overall_composite_score,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankAxis::Productivity => "productivity",
            RankAxis::Impact => "impact",
            RankAxis::Leadership => "leadership",
            RankAxis::Collaboration => "collaboration",
            RankAxis::Overall => "overall",
        }
    }

    pub fn rank(&self, ranks: &AuthorRanks) -> u32 {
        match self {
            RankAxis::Productivity => ranks.productivity,
            RankAxis::Impact => ranks.impact,
            RankAxis::Leadership => ranks.leadership,
            RankAxis::Collaboration => ranks.collaboration,
            RankAxis::Overall => ranks.overall,
        }
    }

    fn slot<'a>(&self, ranks: &'a mut AuthorRanks) -> &'a mut u32 {
        match self {
            RankAxis::Productivity => &mut ranks.productivity,
            RankAxis::Impact => &mut ranks.impact,
            RankAxis::Leadership => &mut ranks.leadership,
            RankAxis::Collaboration => &mut ranks.collaboration,
            RankAxis::Overall => &mut ranks.overall,
        }
    }
}

/// Weighted blend of normalized citations, H-index and highly cited papers.
pub fn impact_score(total_citations: u64, h_index: u32, highly_cited_papers: u32) -> f64 {
    let citation_factor = (total_citations as f64 / 1000.0).min(1.0);
    let h_index_factor = (h_index as f64 / 50.0).min(1.0);
    let highly_cited_factor = (highly_cited_papers as f64 / 10.0).min(1.0);
    0.4 * citation_factor + 0.4 * h_index_factor + 0.2 * highly_cited_factor
}

/// Fixed-weight blend of the five axes.
pub fn overall_composite_score(
    paper_count: u32,
    impact: f64,
    leadership: f64,
    collaboration_ratio: f64,
    rising_star: f64,
) -> f64 {
    0.25 * (paper_count as f64 / 50.0).min(1.0)
        + 0.35 * impact
        + 0.20 * leadership
        + 0.10 * collaboration_ratio.min(1.0)
        + 0.10 * rising_star
}

/// Assigns all five rank positions in place.
pub fn assign_ranks(rows: &mut [AuthorMetrics]) {
    for axis in RankAxis::ALL {
        let order = ranking_order(rows, axis);
        for (position, idx) in order.into_iter().enumerate() {
            *axis.slot(&mut rows[idx].ranks) = position as u32 + 1;
        }
    }
}

/// Row indices from best to worst on one axis.
pub fn ranking_order(rows: &[AuthorMetrics], axis: RankAxis) -> Vec<usize> {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        compare_desc(axis.score(&rows[a]), axis.score(&rows[b]))
            .then_with(|| tie_break(&rows[a].identity, &rows[b].identity))
    });
    order
}

fn compare_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

fn tie_break(a: &AuthorIdentity, b: &AuthorIdentity) -> Ordering {
    a.cmp(b)
}
