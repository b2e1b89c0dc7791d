use crate::authorship::{AuthorshipSummary, PaperIssue, PaperIssueReason};
use crate::matching::{MatchStats, MatchStatsSummary};
use crate::storage::RelationHashes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Full,
    Incremental,
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Full => f.write_str("full"),
            RunMode::Incremental => f.write_str("incremental"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Stopped early. Full runs commit nothing; incremental runs commit
    /// only the authorship edges of papers that finished.
    Cancelled,
}

/// What a run did, appended to `AI/runs.jsonl` and printed by the CLI.
///
/// Every paper the source offered is accounted for: it was either processed,
/// skipped with an issue, or (incremental only) left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source: String,
    pub papers_loaded: usize,
    pub papers_considered: usize,
    pub papers_processed: usize,
    pub papers_skipped: usize,
    pub papers_removed: usize,
    pub edges_emitted: usize,
    pub edges_total: usize,
    pub match_stats: MatchStats,
    pub match_summary: MatchStatsSummary,
    pub issues: Vec<PaperIssue>,
    pub issue_counts: BTreeMap<PaperIssueReason, usize>,
    pub aggregation_gaps: usize,
    pub profiles: usize,
    pub ranked_authors: usize,
    pub hashes: RelationHashes,
}

impl RunSummary {
    pub(crate) fn new(
        run_id: Uuid,
        mode: RunMode,
        started_at: DateTime<Utc>,
        source: String,
        papers_loaded: usize,
        source_issues: Vec<PaperIssue>,
        authorship: AuthorshipSummary,
    ) -> Self {
        let mut issues = source_issues;
        issues.extend(authorship.issues);
        let mut issue_counts = BTreeMap::new();
        for issue in &issues {
            *issue_counts.entry(issue.reason).or_insert(0) += 1;
        }
        Self {
            run_id,
            mode,
            status: if authorship.cancelled {
                RunStatus::Cancelled
            } else {
                RunStatus::Completed
            },
            started_at,
            finished_at: started_at,
            source,
            papers_loaded,
            papers_considered: authorship.papers_considered,
            papers_processed: authorship.papers_processed,
            papers_skipped: authorship.papers_skipped,
            papers_removed: authorship.papers_removed,
            edges_emitted: authorship.edges_emitted,
            edges_total: 0,
            match_summary: authorship.match_stats.summary(),
            match_stats: authorship.match_stats,
            issues,
            issue_counts,
            aggregation_gaps: 0,
            profiles: 0,
            ranked_authors: 0,
            hashes: RelationHashes::default(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == RunStatus::Cancelled
    }

    /// Malformed rows from the source plus papers the builder skipped.
    pub fn error_count(&self) -> usize {
        self.issues.len()
    }

    /// Multi-line, human-readable report.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Run {} ({}, {:?})", self.run_id, self.mode, self.status),
            format!("Source: {}", self.source),
            format!(
                "Papers: {} loaded, {} considered, {} processed, {} skipped, {} removed",
                self.papers_loaded,
                self.papers_considered,
                self.papers_processed,
                self.papers_skipped,
                self.papers_removed
            ),
            format!(
                "Edges: {} emitted this run, {} committed",
                self.edges_emitted, self.edges_total
            ),
            format!("Matching: {}", self.match_summary.describe()),
            format!(
                "Profiles: {}, ranked authors: {}, aggregation gaps: {}",
                self.profiles, self.ranked_authors, self.aggregation_gaps
            ),
        ];
        if self.issue_counts.is_empty() {
            lines.push("Errors: none".to_string());
        } else {
            let counts = self
                .issue_counts
                .iter()
                .map(|(reason, count)| format!("{reason} {count}"))
                .collect::<Vec<_>>()
                .join(", ");
            lines.push(format!("Errors: {} ({counts})", self.error_count()));
        }
        if let Some(hash) = &self.hashes.authorships {
            lines.push(format!("authorships.json sha256 {hash}"));
        }
        if let Some(hash) = &self.hashes.profiles {
            lines.push(format!("author_profiles.json sha256 {hash}"));
        }
        if let Some(hash) = &self.hashes.metrics {
            lines.push(format!("author_metrics.json sha256 {hash}"));
        }
        lines.join("\n")
    }
}
