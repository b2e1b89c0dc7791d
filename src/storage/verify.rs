//! Consistency checks over committed relations.

use super::RelationSnapshot;
use crate::metrics::RankAxis;
use crate::models::{AuthorIdentity, MatchTier, PaperRecord};
use crate::profiles::IdentityIndex;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A paper's edge count differs from its mention count.
    MentionCount {
        paper_id: String,
        mentions: usize,
        edges: usize,
    },
    /// Orders within a paper are not exactly 1..N.
    OrderPermutation { paper_id: String, orders: Vec<usize> },
    /// An unmatched edge carries an external id.
    UnmatchedWithExternalId { paper_id: String, order: usize },
    ProfilePaperCount {
        identity: AuthorIdentity,
        stored: u32,
        edges: u32,
    },
    MissingProfile { identity: AuthorIdentity },
    MissingMetrics { identity: AuthorIdentity },
    /// Rank positions on one axis are not exactly 1..N.
    RankPermutation { axis: &'static str },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MentionCount {
                paper_id,
                mentions,
                edges,
            } => write!(f, "[mentions] {paper_id}: {mentions} mentions but {edges} edges"),
            Violation::OrderPermutation { paper_id, orders } => {
                write!(f, "[order] {paper_id}: orders {orders:?} are not 1..N")
            }
            Violation::UnmatchedWithExternalId { paper_id, order } => {
                write!(f, "[tier] {paper_id}#{order}: unmatched edge has an external id")
            }
            Violation::ProfilePaperCount {
                identity,
                stored,
                edges,
            } => write!(f, "[profile] {identity}: paper_count {stored}, edges {edges}"),
            Violation::MissingProfile { identity } => write!(f, "[profile] {identity}: missing"),
            Violation::MissingMetrics { identity } => write!(f, "[metrics] {identity}: missing"),
            Violation::RankPermutation { axis } => {
                write!(f, "[ranks] {axis} ranks are not a permutation of 1..N")
            }
        }
    }
}

/// Checks the stored relations. When `papers` is given, edge counts are also
/// compared with mention counts for every paper that has edges.
pub fn verify_snapshot(snapshot: &RelationSnapshot, papers: Option<&[PaperRecord]>) -> Vec<Violation> {
    let mut violations = Vec::new();

    let mut orders: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for edge in &snapshot.edges {
        orders.entry(edge.paper_id.as_str()).or_default().push(edge.order);
        if edge.tier == MatchTier::Unmatched && edge.external_id.is_some() {
            violations.push(Violation::UnmatchedWithExternalId {
                paper_id: edge.paper_id.clone(),
                order: edge.order,
            });
        }
    }
    for (paper_id, paper_orders) in &orders {
        let mut sorted = paper_orders.clone();
        sorted.sort_unstable();
        if !sorted.iter().enumerate().all(|(idx, order)| *order == idx + 1) {
            violations.push(Violation::OrderPermutation {
                paper_id: paper_id.to_string(),
                orders: sorted,
            });
        }
    }

    if let Some(papers) = papers {
        let mut seen = BTreeSet::new();
        for paper in papers {
            if !seen.insert(paper.paper_id.as_str()) {
                continue;
            }
            let Some(paper_orders) = orders.get(paper.paper_id.as_str()) else {
                continue;
            };
            let mentions = paper.primary_authors.as_ref().map_or(0, Vec::len);
            if mentions != paper_orders.len() {
                violations.push(Violation::MentionCount {
                    paper_id: paper.paper_id.clone(),
                    mentions,
                    edges: paper_orders.len(),
                });
            }
        }
    }

    let identities = IdentityIndex::build(&snapshot.edges);
    let expected: BTreeMap<AuthorIdentity, u32> = identities
        .group(&snapshot.edges)
        .into_iter()
        .map(|(identity, edges)| (identity, edges.len() as u32))
        .collect();
    let profiles: BTreeMap<&AuthorIdentity, u32> = snapshot
        .profiles
        .iter()
        .map(|p| (&p.identity, p.paper_count))
        .collect();
    let metrics: BTreeSet<&AuthorIdentity> = snapshot.metrics.iter().map(|m| &m.identity).collect();
    for (identity, edges) in &expected {
        match profiles.get(identity) {
            None => violations.push(Violation::MissingProfile {
                identity: identity.clone(),
            }),
            Some(stored) if stored != edges => violations.push(Violation::ProfilePaperCount {
                identity: identity.clone(),
                stored: *stored,
                edges: *edges,
            }),
            Some(_) => {}
        }
        if !metrics.contains(identity) {
            violations.push(Violation::MissingMetrics {
                identity: identity.clone(),
            });
        }
    }

    for axis in RankAxis::ALL {
        let mut positions: Vec<u32> = snapshot.metrics.iter().map(|m| axis.rank(&m.ranks)).collect();
        positions.sort_unstable();
        if !positions.iter().enumerate().all(|(idx, p)| *p as usize == idx + 1) {
            violations.push(Violation::RankPermutation { axis: axis.label() });
        }
    }

    violations
}
