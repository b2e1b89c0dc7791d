use super::support::corpus::{paper, record, sample_corpus};
use super::IntegrationHarness;
use anyhow::Result;
use authorbase::models::{AuthorIdentity, MatchTier, PaperRecord};
use authorbase::orchestration::{CancelFlag, Pipeline, RunStatus};
use authorbase::storage::{verify_snapshot, ChangeSet, MemoryPaperSource, PaperSource};
use std::thread;
use std::time::Duration;

/// p1 edited without being listed as changed, p2 deleted upstream, p3 now
/// carries an enrichment record for its former unmatched author.
fn edited_corpus() -> Vec<PaperRecord> {
    let mut papers: Vec<PaperRecord> = sample_corpus()
        .into_iter()
        .filter(|p| p.paper_id != "p2")
        .collect();
    for paper_row in papers.iter_mut() {
        if paper_row.paper_id == "p1" {
            paper_row.enrichment_authors = Some(vec![
                record("John Smith", Some("s1")),
                record("Amy Lee", Some("zzz")),
            ]);
        }
        if paper_row.paper_id == "p3" {
            *paper_row = paper(
                "p3",
                &["John Smyth", "Grad Student"],
                vec![record("John Smith", Some("s1")), record("Grad Student", Some("g1"))],
                8,
                2023,
            );
        }
    }
    papers
}

#[test]
fn only_changed_papers_are_rebuilt() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    let pipeline = harness.pipeline();
    pipeline.run_full(&harness.source())?;
    let before = harness.store().load_edges()?;

    harness.write_papers("part-0.jsonl", &edited_corpus());
    let changes = ChangeSet::new(["p3", "p2"]);
    let summary = pipeline.run_incremental(&harness.source(), &changes)?;

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.papers_considered, 1);
    assert_eq!(summary.papers_processed, 1);
    assert_eq!(summary.papers_removed, 1);
    assert_eq!(summary.match_summary.total_match_attempts, 2);

    let snapshot = harness.store().load_snapshot()?;
    let p1_before: Vec<_> = before.iter().filter(|e| e.paper_id == "p1").collect();
    let p1_after: Vec<_> = snapshot.edges.iter().filter(|e| e.paper_id == "p1").collect();
    assert_eq!(p1_before, p1_after);
    assert!(!snapshot.edges.iter().any(|e| e.paper_id == "p2"));

    let student = snapshot
        .edges
        .iter()
        .find(|e| e.paper_id == "p3" && e.primary_name == "Grad Student")
        .expect("p3 still has its second author");
    assert_eq!(student.tier, MatchTier::Exact);
    assert_eq!(student.external_id.as_deref(), Some("g1"));

    // the unmatched p4 edge follows its name to the new external identity
    let g1 = snapshot
        .profiles
        .iter()
        .find(|p| p.identity == AuthorIdentity::External("g1".into()))
        .expect("Grad Student resolved to g1");
    assert_eq!(g1.paper_count, 2);
    assert!(!snapshot
        .profiles
        .iter()
        .any(|p| p.identity == AuthorIdentity::External("wA".into())));

    let papers = harness.source().load_papers()?.papers;
    assert!(verify_snapshot(&snapshot, Some(papers.as_slice())).is_empty());
    Ok(())
}

#[test]
fn incremental_from_file_reads_the_change_set() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    let pipeline = harness.pipeline();
    pipeline.run_full(&harness.source())?;

    harness.write_papers("part-0.jsonl", &edited_corpus());
    let path = harness.workspace_path().join("changes.json");
    ChangeSet::new(["p3"]).save(&path)?;
    let summary = pipeline.run_incremental_from(&harness.source(), &path)?;
    assert_eq!(summary.papers_processed, 1);
    assert_eq!(summary.papers_removed, 0);
    // p2 was not listed, so its edges survive
    let edges = harness.store().load_edges()?;
    assert_eq!(edges.iter().filter(|e| e.paper_id == "p2").count(), 3);
    Ok(())
}

#[test]
fn cancelled_incremental_run_keeps_previous_edges() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    harness.pipeline().run_full(&harness.source())?;
    let before = harness.relation_hashes();

    harness.write_papers("part-0.jsonl", &edited_corpus());
    let cancel = CancelFlag::new();
    cancel.cancel();
    let pipeline = Pipeline::new(&harness.workspace()).with_cancel_flag(cancel);
    let summary = pipeline.run_incremental(&harness.source(), &ChangeSet::new(["p2", "p3"]))?;

    assert_eq!(summary.status, RunStatus::Cancelled);
    assert_eq!(summary.papers_processed, 0);
    assert_eq!(summary.papers_removed, 0);
    assert!(summary.hashes.profiles.is_none());
    assert_eq!(harness.relation_hashes(), before);
    Ok(())
}

/// Twelve authors per paper, each matched exactly to an id under `prefix`.
fn wide_corpus(papers: usize, prefix: &str) -> Vec<PaperRecord> {
    (0..papers)
        .map(|idx| {
            let mentions: Vec<String> = (0..12).map(|a| format!("Author{a} Person{idx}")).collect();
            let mention_refs: Vec<&str> = mentions.iter().map(String::as_str).collect();
            let records = mentions
                .iter()
                .enumerate()
                .map(|(a, name)| {
                    let id = format!("{prefix}-{idx}-{a}");
                    record(name, Some(id.as_str()))
                })
                .collect();
            paper(&format!("paper-{idx:05}"), &mention_refs, records, 3, 2022)
        })
        .collect()
}

#[test]
fn cancelling_mid_run_keeps_relations_consistent() -> Result<()> {
    let harness = IntegrationHarness::new();
    let mut workspace = harness.workspace();
    workspace.config.authorship.max_parallel_papers = 1;
    Pipeline::new(&workspace).run_full(&MemoryPaperSource::new(wide_corpus(2000, "old")))?;

    // every changed paper now resolves to identities nobody has a profile for yet
    let edited = wide_corpus(2000, "new");
    let changes = ChangeSet::new(edited.iter().map(|p| p.paper_id.clone()));

    let cancel = CancelFlag::new();
    let pipeline = Pipeline::new(&workspace).with_cancel_flag(cancel.clone());
    let trigger = thread::spawn(move || {
        thread::sleep(Duration::from_millis(5));
        cancel.cancel();
    });
    let summary = pipeline.run_incremental(&MemoryPaperSource::new(edited.clone()), &changes)?;
    trigger.join().expect("cancel thread finished");

    let snapshot = harness.store().load_snapshot()?;
    let violations = verify_snapshot(&snapshot, None);
    assert!(violations.is_empty(), "{violations:?}");
    if summary.papers_processed > 0 {
        assert!(summary.hashes.profiles.is_some());
        assert!(snapshot
            .profiles
            .iter()
            .any(|p| p.identity.to_string().starts_with("ext:new-")));
    }
    if summary.is_cancelled() {
        assert!(summary.papers_processed < edited.len());
    }
    Ok(())
}
