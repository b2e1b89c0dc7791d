use crate::models::{AuthorIdentity, AuthorshipEdge, CollaborationMetrics};
use crate::profiles::IdentityIndex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Co-authorship frequencies between identities.
///
/// Each paper contributes at most one co-authorship per pair of distinct
/// identities, however many edges either identity holds on it.
#[derive(Debug, Clone, Default)]
pub struct CollaborationGraph {
    neighbours: HashMap<AuthorIdentity, BTreeMap<AuthorIdentity, u32>>,
}

impl CollaborationGraph {
    pub fn build(edges: &[AuthorshipEdge], identities: &IdentityIndex) -> Self {
        let mut papers: BTreeMap<&str, BTreeSet<AuthorIdentity>> = BTreeMap::new();
        for edge in edges {
            papers
                .entry(edge.paper_id.as_str())
                .or_default()
                .insert(identities.identity_for(edge));
        }

        let mut neighbours: HashMap<AuthorIdentity, BTreeMap<AuthorIdentity, u32>> =
            HashMap::new();
        for authors in papers.values() {
            for author in authors {
                let row = neighbours.entry(author.clone()).or_default();
                for other in authors.iter().filter(|other| *other != author) {
                    *row.entry(other.clone()).or_insert(0) += 1;
                }
            }
        }
        Self { neighbours }
    }

    /// Co-authorship count per collaborator; empty for solo authors.
    pub fn collaborators(&self, identity: &AuthorIdentity) -> Option<&BTreeMap<AuthorIdentity, u32>> {
        self.neighbours.get(identity)
    }

    pub fn metrics_for(&self, identity: &AuthorIdentity, paper_count: u32) -> CollaborationMetrics {
        let Some(collaborators) = self.collaborators(identity).filter(|c| !c.is_empty()) else {
            return CollaborationMetrics::default();
        };
        let unique = collaborators.len() as u32;
        let total: u32 = collaborators.values().sum();
        let max = collaborators.values().copied().max().unwrap_or(1).max(1);
        let centrality = collaborators
            .values()
            .map(|count| *count as f64 / max as f64)
            .sum::<f64>()
            / unique as f64;
        let per_paper = |value: f64| {
            if paper_count == 0 {
                0.0
            } else {
                value / paper_count as f64
            }
        };

        CollaborationMetrics {
            total_collaborations: total,
            unique_collaborators: unique,
            avg_collaborators_per_paper: per_paper(total as f64),
            collaboration_ratio: per_paper(unique as f64).min(1.0),
            network_centrality: centrality,
            collaboration_diversity_score: (unique as f64 / 10.0).min(1.0),
        }
    }
}
