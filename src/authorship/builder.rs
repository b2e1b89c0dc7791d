use super::error::{PaperIssue, PaperIssueReason};
use crate::bases::{AuthorshipSettings, MatcherSettings, OrderPolicy};
use crate::matching::{match_authors, MatchOutcome, MatchStats};
use crate::models::{AuthorshipEdge, ExternalAuthorRecord, MatchTier, PaperRecord};
use crate::orchestration::CancelFlag;
use crate::storage::ChangeSet;
use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info, warn};

/// Counters for one builder invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthorshipSummary {
    /// Papers offered to the builder (for incremental runs, changed papers only).
    pub papers_considered: usize,
    pub papers_processed: usize,
    pub papers_skipped: usize,
    /// Changed papers that no longer exist upstream; their edges were dropped.
    pub papers_removed: usize,
    pub edges_emitted: usize,
    pub match_stats: MatchStats,
    pub issues: Vec<PaperIssue>,
    pub cancelled: bool,
}

/// Edges produced by a full build, sorted by (paper_id, order).
#[derive(Debug, Clone, Default)]
pub struct AuthorshipBuild {
    pub edges: Vec<AuthorshipEdge>,
    pub summary: AuthorshipSummary,
}

/// Full edge set after replacing changed papers' edges.
#[derive(Debug, Clone, Default)]
pub struct IncrementalBuild {
    pub edges: Vec<AuthorshipEdge>,
    pub replaced_papers: BTreeSet<String>,
    pub removed_papers: BTreeSet<String>,
    pub summary: AuthorshipSummary,
}

struct PaperEdges {
    paper_id: String,
    edges: Vec<AuthorshipEdge>,
    stats: MatchStats,
}

/// Runs the matcher over papers and turns each outcome into edges.
pub struct AuthorshipBuilder {
    matcher: MatcherSettings,
    settings: AuthorshipSettings,
    cancel: CancelFlag,
}

impl AuthorshipBuilder {
    pub fn new(matcher: MatcherSettings, settings: AuthorshipSettings) -> Self {
        Self {
            matcher,
            settings,
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Builds edges for every well-formed paper.
    pub fn build_all(&self, papers: &[PaperRecord]) -> Result<AuthorshipBuild> {
        let (accepted, issues) = screen_papers(papers.iter());
        let mut summary = AuthorshipSummary {
            papers_considered: papers.len(),
            issues,
            ..AuthorshipSummary::default()
        };
        summary.papers_skipped = summary.issues.len();
        info!(papers = papers.len(), "building authorship edges");

        let results = self.process(&accepted)?;
        summary.cancelled = results.len() < accepted.len();
        let mut edges = Vec::new();
        for result in results {
            summary.papers_processed += 1;
            summary.match_stats.merge(&result.stats);
            edges.extend(result.edges);
        }
        summary.edges_emitted = edges.len();
        sort_edges(&mut edges);
        log_summary(&summary);
        Ok(AuthorshipBuild { edges, summary })
    }

    /// Rebuilds only the papers named in `changes`, replacing their previous
    /// edges wholesale. Papers that were not reached before cancellation keep
    /// their previous edges.
    pub fn build_incremental(
        &self,
        papers: &[PaperRecord],
        previous: Vec<AuthorshipEdge>,
        changes: &ChangeSet,
    ) -> Result<IncrementalBuild> {
        let changed_rows: Vec<&PaperRecord> = papers
            .iter()
            .filter(|paper| changes.contains(&paper.paper_id))
            .collect();
        let known: HashSet<&str> = papers.iter().map(|p| p.paper_id.as_str()).collect();

        let (accepted, issues) = screen_papers(changed_rows.iter().copied());
        let mut summary = AuthorshipSummary {
            papers_considered: changed_rows.len(),
            issues,
            ..AuthorshipSummary::default()
        };
        summary.papers_skipped = summary.issues.len();
        info!(
            changed = changes.len(),
            present = changed_rows.len(),
            "rebuilding authorship edges for changed papers"
        );

        let results = self.process(&accepted)?;
        summary.cancelled = results.len() < accepted.len();

        let mut replaced_papers = BTreeSet::new();
        let mut fresh = Vec::new();
        for result in results {
            summary.papers_processed += 1;
            summary.match_stats.merge(&result.stats);
            replaced_papers.insert(result.paper_id);
            fresh.extend(result.edges);
        }
        summary.edges_emitted = fresh.len();

        let removed_papers: BTreeSet<String> = if summary.cancelled {
            BTreeSet::new()
        } else {
            changes
                .paper_ids
                .iter()
                .filter(|id| !known.contains(id.as_str()))
                .cloned()
                .collect()
        };
        summary.papers_removed = removed_papers.len();

        let mut edges: Vec<AuthorshipEdge> = previous
            .into_iter()
            .filter(|edge| {
                !replaced_papers.contains(&edge.paper_id) && !removed_papers.contains(&edge.paper_id)
            })
            .collect();
        edges.extend(fresh);
        sort_edges(&mut edges);
        log_summary(&summary);

        Ok(IncrementalBuild {
            edges,
            replaced_papers,
            removed_papers,
            summary,
        })
    }

    fn process(&self, papers: &[ValidPaper<'_>]) -> Result<Vec<PaperEdges>> {
        if papers.is_empty() {
            return Ok(Vec::new());
        }
        let concurrency = self.settings.max_parallel_papers.max(1) as usize;
        let interval = self.settings.progress_log_interval.max(1) as usize;
        let total = papers.len();
        let done = AtomicUsize::new(0);
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency)
            .build()
            .context("Failed to configure authorship thread pool")?;

        let results = pool.install(|| {
            papers
                .par_iter()
                .map(|paper| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }
                    let outcome = match_authors(paper.mentions, paper.records, &self.matcher);
                    let edges = edges_for_paper(paper.record, &outcome, self.settings.order_policy);
                    let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if finished % interval == 0 {
                        info!(processed = finished, total, "authorship progress");
                    }
                    Some(PaperEdges {
                        paper_id: paper.record.paper_id.clone(),
                        edges,
                        stats: outcome.stats,
                    })
                })
                .collect::<Vec<_>>()
        });
        Ok(results.into_iter().flatten().collect())
    }
}

/// Turns one paper's match outcome into one edge per mention.
///
/// Orders are always a permutation of 1..N. Under `Publication` they follow
/// the mention positions; under `MatchedFirst` matched mentions come first in
/// acceptance order, then unmatched ones in source order.
pub fn edges_for_paper(
    paper: &PaperRecord,
    outcome: &MatchOutcome,
    policy: OrderPolicy,
) -> Vec<AuthorshipEdge> {
    let mention_count = outcome.mention_count();
    let mut by_mention = vec![None; mention_count];
    for pair in &outcome.matched {
        by_mention[pair.mention_index] = Some(pair);
    }

    let sequence: Vec<usize> = match policy {
        OrderPolicy::Publication => (0..mention_count).collect(),
        OrderPolicy::MatchedFirst => outcome
            .matched
            .iter()
            .map(|pair| pair.mention_index)
            .chain(outcome.unmatched.iter().map(|u| u.mention_index))
            .collect(),
    };

    let mut edges = Vec::with_capacity(mention_count);
    for (slot, mention_index) in sequence.into_iter().enumerate() {
        let edge = match by_mention[mention_index] {
            Some(pair) => AuthorshipEdge {
                paper_id: paper.paper_id.clone(),
                paper_title: paper.title.clone(),
                primary_name: pair.mention_name.clone(),
                external_name: Some(pair.record.name.clone()),
                external_id: pair.record.external_id.clone(),
                order: slot + 1,
                mention_position: mention_index + 1,
                tier: pair.tier,
                match_method: pair.tier.method_label().to_string(),
            },
            None => {
                let raw = outcome
                    .unmatched
                    .iter()
                    .find(|u| u.mention_index == mention_index)
                    .map(|u| u.mention_name.clone())
                    .unwrap_or_default();
                AuthorshipEdge {
                    paper_id: paper.paper_id.clone(),
                    paper_title: paper.title.clone(),
                    primary_name: raw,
                    external_name: None,
                    external_id: None,
                    order: slot + 1,
                    mention_position: mention_index + 1,
                    tier: MatchTier::Unmatched,
                    match_method: MatchTier::Unmatched.method_label().to_string(),
                }
            }
        };
        edges.push(edge);
    }
    edges
}

struct ValidPaper<'a> {
    record: &'a PaperRecord,
    mentions: &'a [String],
    records: &'a [ExternalAuthorRecord],
}

/// Splits papers into well-formed ones and issues. The first row for a paper
/// id wins; later rows with the same id are reported as duplicates.
fn screen_papers<'a>(
    papers: impl Iterator<Item = &'a PaperRecord>,
) -> (Vec<ValidPaper<'a>>, Vec<PaperIssue>) {
    let mut accepted = Vec::new();
    let mut issues = Vec::new();
    let mut seen: HashSet<&'a str> = HashSet::new();

    for paper in papers {
        let id = paper.paper_id.trim();
        if id.is_empty() {
            issues.push(PaperIssue {
                paper_id: None,
                location: None,
                reason: PaperIssueReason::MissingIdentifier,
                message: format!("Paper titled {:?} has no identifier", paper.title),
            });
            continue;
        }
        if !seen.insert(paper.paper_id.as_str()) {
            issues.push(PaperIssue::new(
                id,
                PaperIssueReason::DuplicatePaper,
                "Paper id appears more than once; keeping the first row",
            ));
            continue;
        }
        let Some(mentions) = paper.primary_authors.as_deref() else {
            issues.push(PaperIssue::new(
                id,
                PaperIssueReason::MissingPrimaryAuthors,
                "Primary author list is missing",
            ));
            continue;
        };
        let Some(records) = paper.enrichment_authors.as_deref() else {
            issues.push(PaperIssue::new(
                id,
                PaperIssueReason::MissingEnrichmentAuthors,
                "Enrichment author list is missing",
            ));
            continue;
        };
        accepted.push(ValidPaper {
            record: paper,
            mentions,
            records,
        });
    }

    for issue in &issues {
        warn!(
            paper_id = issue.paper_id.as_deref().unwrap_or("<none>"),
            reason = %issue.reason,
            "skipping paper"
        );
    }
    (accepted, issues)
}

fn sort_edges(edges: &mut [AuthorshipEdge]) {
    edges.sort_by(|a, b| a.paper_id.cmp(&b.paper_id).then(a.order.cmp(&b.order)));
}

fn log_summary(summary: &AuthorshipSummary) {
    info!(
        processed = summary.papers_processed,
        skipped = summary.papers_skipped,
        removed = summary.papers_removed,
        edges = summary.edges_emitted,
        cancelled = summary.cancelled,
        "authorship build finished"
    );
    debug!("{}", summary.match_stats.summary().describe());
}
