use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaperIssueReason {
    UnparseableRow,
    MissingIdentifier,
    MissingPrimaryAuthors,
    MissingEnrichmentAuthors,
    DuplicatePaper,
}

impl fmt::Display for PaperIssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaperIssueReason::UnparseableRow => "unparseable_row",
            PaperIssueReason::MissingIdentifier => "missing_identifier",
            PaperIssueReason::MissingPrimaryAuthors => "missing_primary_authors",
            PaperIssueReason::MissingEnrichmentAuthors => "missing_enrichment_authors",
            PaperIssueReason::DuplicatePaper => "duplicate_paper",
        };
        f.write_str(label)
    }
}

/// A paper that was skipped. Never fatal for the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperIssue {
    /// Absent when the row could not be read far enough to find it.
    pub paper_id: Option<String>,
    /// Source location such as `papers/part-0.jsonl:17`, when known.
    #[serde(default)]
    pub location: Option<String>,
    pub reason: PaperIssueReason,
    pub message: String,
}

impl PaperIssue {
    pub fn new(
        paper_id: impl Into<String>,
        reason: PaperIssueReason,
        message: impl Into<String>,
    ) -> Self {
        Self {
            paper_id: Some(paper_id.into()),
            location: None,
            reason,
            message: message.into(),
        }
    }

    pub fn unparseable(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            paper_id: None,
            location: Some(location.into()),
            reason: PaperIssueReason::UnparseableRow,
            message: message.into(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
