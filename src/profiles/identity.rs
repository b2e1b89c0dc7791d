//! Maps every authorship edge to exactly one `AuthorIdentity`.
//!
//! Edges are keyed by their canonical primary name. A name that was matched
//! to one or more external ids anywhere in the corpus resolves to the sorted,
//! comma-joined set of those ids, including on papers where the same name
//! went unmatched. Names that were never matched resolve to themselves.

use crate::models::{AuthorIdentity, AuthorshipEdge};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Display-preserving canonical form used as the grouping key: trimmed with
/// inner whitespace collapsed. Disambiguation suffixes such as "0001" are
/// kept, since they separate people in the primary source.
pub fn canonical_primary_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Clone, Default)]
pub struct IdentityIndex {
    by_name: HashMap<String, AuthorIdentity>,
}

impl IdentityIndex {
    pub fn build(edges: &[AuthorshipEdge]) -> Self {
        let mut ids_by_name: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for edge in edges {
            let ids = ids_by_name
                .entry(canonical_primary_name(&edge.primary_name))
                .or_default();
            if let Some(id) = edge.external_id.as_deref().map(str::trim) {
                if edge.is_matched() && !id.is_empty() {
                    ids.insert(id.to_string());
                }
            }
        }
        let by_name = ids_by_name
            .into_iter()
            .map(|(name, ids)| {
                let identity = AuthorIdentity::from_external_ids(&ids)
                    .unwrap_or_else(|| AuthorIdentity::from_name(&name));
                (name, identity)
            })
            .collect();
        Self { by_name }
    }

    /// Identity for an edge. Edges outside the set the index was built from
    /// fall back to their name identity.
    pub fn identity_for(&self, edge: &AuthorshipEdge) -> AuthorIdentity {
        let name = canonical_primary_name(&edge.primary_name);
        match self.by_name.get(&name) {
            Some(identity) => identity.clone(),
            None => AuthorIdentity::from_name(&name),
        }
    }

    /// Edges grouped by identity, in identity order.
    pub fn group<'e>(
        &self,
        edges: &'e [AuthorshipEdge],
    ) -> BTreeMap<AuthorIdentity, Vec<&'e AuthorshipEdge>> {
        let mut groups: BTreeMap<AuthorIdentity, Vec<&AuthorshipEdge>> = BTreeMap::new();
        for edge in edges {
            groups.entry(self.identity_for(edge)).or_default().push(edge);
        }
        groups
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
