use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Aggregation key for one person.
///
/// Ordering (used as the deterministic ranking tie-break) puts external
/// identities before name keys, then compares the key text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum AuthorIdentity {
    /// Comma-joined, sorted set of external identifiers.
    External(String),
    /// Canonical primary name, used when no external record was ever matched.
    Name(String),
}

impl AuthorIdentity {
    pub fn from_external_ids(ids: &BTreeSet<String>) -> Option<Self> {
        if ids.is_empty() {
            return None;
        }
        Some(AuthorIdentity::External(
            ids.iter().cloned().collect::<Vec<_>>().join(","),
        ))
    }

    pub fn from_name(canonical_name: &str) -> Self {
        AuthorIdentity::Name(canonical_name.to_string())
    }

    pub fn key(&self) -> &str {
        match self {
            AuthorIdentity::External(key) | AuthorIdentity::Name(key) => key,
        }
    }

    pub fn external_ids(&self) -> Vec<&str> {
        match self {
            AuthorIdentity::External(key) => key.split(',').collect(),
            AuthorIdentity::Name(_) => Vec::new(),
        }
    }

    pub fn has_external_id(&self) -> bool {
        matches!(self, AuthorIdentity::External(_))
    }
}

impl fmt::Display for AuthorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthorIdentity::External(key) => write!(f, "ext:{key}"),
            AuthorIdentity::Name(key) => write!(f, "name:{key}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchConfidence {
    High,
    Low,
}

/// One row per `AuthorIdentity`, derived entirely from its authorship edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub identity: AuthorIdentity,
    pub primary_names: Vec<String>,
    pub external_names: Vec<String>,
    pub paper_count: u32,
    pub total_citations: u64,
    pub total_influential_citations: u64,
    pub avg_citations: f64,
    pub first_publication_year: Option<i32>,
    pub latest_publication_year: Option<i32>,
    pub career_length: u32,
    pub first_author_count: u32,
    pub last_author_count: u32,
    pub middle_author_count: u32,
    pub first_author_ratio: f64,
    pub last_author_ratio: f64,
    pub contribution_score: f64,
    pub rising_star_score: f64,
    pub data_completeness_score: f64,
    pub match_confidence: MatchConfidence,
}

impl AuthorProfile {
    /// Preferred display name: first external name, else first primary name.
    pub fn display_name(&self) -> &str {
        self.external_names
            .first()
            .or_else(|| self.primary_names.first())
            .map(String::as_str)
            .unwrap_or_else(|| self.identity.key())
    }
}
