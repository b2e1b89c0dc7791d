//! Runs the stages in order: authorships, profiles, metrics, one commit.
//!
//! A stage starts only after the previous one returned its full output, and
//! nothing reaches the relation store until every stage has finished. Fatal
//! errors therefore leave the previously committed relations as they were.
//! A cancelled incremental run still rebuilds profiles and metrics over the
//! edges it keeps, so the three relations always describe one edge set.

use super::summary::{RunMode, RunSummary};
use super::{CancelFlag, RunEvent, RunEventType, RunLog};
use crate::authorship::AuthorshipBuilder;
use crate::bases::{EngineConfig, Workspace};
use crate::metrics::compute_metrics;
use crate::models::{AuthorshipEdge, PaperRecord};
use crate::profiles::{aggregate_profiles, index_paper_stats};
use crate::storage::{ChangeSet, PaperSource, RelationSnapshot, RelationStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::path::Path;
use tracing::{error, info, warn};
use uuid::Uuid;

pub struct Pipeline {
    config: EngineConfig,
    store: RelationStore,
    log: RunLog,
    cancel: CancelFlag,
}

impl Pipeline {
    pub fn new(workspace: &Workspace) -> Self {
        Self {
            config: workspace.config.clone(),
            store: RelationStore::new(workspace.layout.clone()),
            log: RunLog::for_layout(&workspace.layout),
            cancel: CancelFlag::default(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Handle that stops the current run from another thread.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &RelationStore {
        &self.store
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Rebuilds every relation from all papers in `source`.
    pub fn run_full(&self, source: &dyn PaperSource) -> Result<RunSummary> {
        self.execute(RunMode::Full, source, |run_id, started_at| {
            self.full_stages(run_id, started_at, source)
        })
    }

    /// Re-matches only the papers in `changes`, then rebuilds profiles and
    /// metrics over the full edge set.
    pub fn run_incremental(
        &self,
        source: &dyn PaperSource,
        changes: &ChangeSet,
    ) -> Result<RunSummary> {
        self.execute(RunMode::Incremental, source, |run_id, started_at| {
            self.incremental_stages(run_id, started_at, source, changes)
        })
    }

    /// Like `run_incremental`, reading the change set from a JSON file. A
    /// missing or unreadable file fails the run.
    pub fn run_incremental_from(
        &self,
        source: &dyn PaperSource,
        changes_path: &Path,
    ) -> Result<RunSummary> {
        self.execute(RunMode::Incremental, source, |run_id, started_at| {
            let changes = ChangeSet::load(changes_path)?;
            self.incremental_stages(run_id, started_at, source, &changes)
        })
    }

    fn execute<F>(&self, mode: RunMode, source: &dyn PaperSource, stages: F) -> Result<RunSummary>
    where
        F: FnOnce(Uuid, DateTime<Utc>) -> Result<RunSummary>,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let described = source.describe();
        info!(%run_id, %mode, source = %described, "run started");
        self.event(
            run_id,
            RunEventType::RunStarted,
            json!({ "mode": mode, "source": described }),
        )?;

        match stages(run_id, started_at) {
            Ok(mut summary) => {
                summary.finished_at = Utc::now();
                let event_type = if summary.is_cancelled() {
                    RunEventType::RunCancelled
                } else {
                    RunEventType::RunCompleted
                };
                self.event(
                    run_id,
                    event_type,
                    json!({
                        "papers_processed": summary.papers_processed,
                        "papers_skipped": summary.papers_skipped,
                        "edges_total": summary.edges_total,
                    }),
                )?;
                self.log.record_run(&summary)?;
                info!(
                    %run_id,
                    status = ?summary.status,
                    processed = summary.papers_processed,
                    skipped = summary.papers_skipped,
                    "run finished"
                );
                Ok(summary)
            }
            Err(err) => {
                error!(%run_id, error = %format!("{err:#}"), "run failed");
                let failed = RunEvent::new(
                    run_id,
                    RunEventType::RunFailed,
                    json!({ "error": format!("{err:#}") }),
                );
                if let Err(log_err) = self.log.append_event(&failed) {
                    warn!(%run_id, error = %log_err, "could not record run failure");
                }
                Err(err)
            }
        }
    }

    fn full_stages(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        source: &dyn PaperSource,
    ) -> Result<RunSummary> {
        let batch = source.load_papers().context("Paper input is unavailable")?;
        let build = self.builder().build_all(&batch.papers)?;
        self.event(
            run_id,
            RunEventType::AuthorshipsBuilt,
            json!({
                "edges": build.edges.len(),
                "papers_processed": build.summary.papers_processed,
                "papers_skipped": build.summary.papers_skipped,
            }),
        )?;

        let mut summary = RunSummary::new(
            run_id,
            RunMode::Full,
            started_at,
            source.describe(),
            batch.papers.len(),
            batch.issues,
            build.summary,
        );
        if summary.is_cancelled() {
            warn!(%run_id, "full run cancelled; relations left untouched");
            return Ok(summary);
        }
        self.rebuild_and_commit(run_id, &batch.papers, build.edges, &mut summary)?;
        Ok(summary)
    }

    fn incremental_stages(
        &self,
        run_id: Uuid,
        started_at: DateTime<Utc>,
        source: &dyn PaperSource,
        changes: &ChangeSet,
    ) -> Result<RunSummary> {
        let batch = source.load_papers().context("Paper input is unavailable")?;
        let previous = self
            .store
            .load_edges()
            .context("Stored authorships are unreadable")?;
        let build = self
            .builder()
            .build_incremental(&batch.papers, previous, changes)?;
        self.event(
            run_id,
            RunEventType::AuthorshipsBuilt,
            json!({
                "edges": build.edges.len(),
                "replaced_papers": build.replaced_papers.len(),
                "removed_papers": build.removed_papers,
            }),
        )?;

        let mut summary = RunSummary::new(
            run_id,
            RunMode::Incremental,
            started_at,
            source.describe(),
            batch.papers.len(),
            batch.issues,
            build.summary,
        );
        if summary.is_cancelled() {
            if build.replaced_papers.is_empty() {
                warn!(%run_id, "incremental run cancelled before any paper finished");
                return Ok(summary);
            }
            warn!(
                %run_id,
                finished = build.replaced_papers.len(),
                "incremental run cancelled; committing finished papers only"
            );
        }
        self.rebuild_and_commit(run_id, &batch.papers, build.edges, &mut summary)?;
        Ok(summary)
    }

    fn rebuild_and_commit(
        &self,
        run_id: Uuid,
        papers: &[PaperRecord],
        edges: Vec<AuthorshipEdge>,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let stats = index_paper_stats(papers);
        let aggregation = aggregate_profiles(&edges, &stats, &self.config.metrics);
        self.event(
            run_id,
            RunEventType::ProfilesRebuilt,
            json!({
                "profiles": aggregation.profiles.len(),
                "aggregation_gaps": aggregation.aggregation_gaps,
            }),
        )?;

        let metrics = compute_metrics(&aggregation, &edges, &stats, &self.config.metrics);
        self.event(
            run_id,
            RunEventType::MetricsRebuilt,
            json!({ "authors": metrics.len() }),
        )?;

        summary.aggregation_gaps = aggregation.aggregation_gaps;
        summary.profiles = aggregation.profiles.len();
        summary.ranked_authors = metrics.len();
        summary.edges_total = edges.len();
        let snapshot = RelationSnapshot {
            edges,
            profiles: aggregation.profiles,
            metrics,
        };
        summary.hashes = self.store.commit(&snapshot)?;
        Ok(())
    }

    fn builder(&self) -> AuthorshipBuilder {
        AuthorshipBuilder::new(self.config.matcher, self.config.authorship.clone())
            .with_cancel_flag(self.cancel.clone())
    }

    fn event(&self, run_id: Uuid, event_type: RunEventType, details: serde_json::Value) -> Result<()> {
        self.log
            .append_event(&RunEvent::new(run_id, event_type, details))
    }
}
