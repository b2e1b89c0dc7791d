use serde::{Deserialize, Serialize};
use std::fmt;

/// Matching pass that produced an edge, used as its confidence label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    Exact,
    PositionDisambiguated,
    Initialism,
    Fuzzy,
    Unmatched,
}

impl MatchTier {
    pub const ALL: [MatchTier; 5] = [
        MatchTier::Exact,
        MatchTier::PositionDisambiguated,
        MatchTier::Initialism,
        MatchTier::Fuzzy,
        MatchTier::Unmatched,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::PositionDisambiguated => "position-disambiguated",
            MatchTier::Initialism => "initialism",
            MatchTier::Fuzzy => "fuzzy",
            MatchTier::Unmatched => "unmatched",
        }
    }

    /// Label stored in `AuthorshipEdge::match_method`.
    pub fn method_label(&self) -> &'static str {
        match self {
            MatchTier::Exact => "exact_normalized_name",
            MatchTier::PositionDisambiguated => "closest_position_duplicate_name",
            MatchTier::Initialism => "initials_pattern",
            MatchTier::Fuzzy => "fuzzy_similarity",
            MatchTier::Unmatched => "no_match_found",
        }
    }

    pub fn is_matched(&self) -> bool {
        !matches!(self, MatchTier::Unmatched)
    }
}

impl fmt::Display for MatchTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved relationship for one (paper, position) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorshipEdge {
    pub paper_id: String,
    pub paper_title: String,
    pub primary_name: String,
    pub external_name: Option<String>,
    pub external_id: Option<String>,
    /// 1..N within the paper.
    pub order: usize,
    /// Position of the mention in the primary-source listing.
    pub mention_position: usize,
    pub tier: MatchTier,
    pub match_method: String,
}

impl AuthorshipEdge {
    pub fn is_matched(&self) -> bool {
        self.tier.is_matched()
    }
}
