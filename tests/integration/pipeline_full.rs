use super::support::corpus::sample_corpus;
use super::IntegrationHarness;
use anyhow::Result;
use authorbase::authorship::PaperIssueReason;
use authorbase::models::{AuthorIdentity, MatchConfidence, MatchTier};
use authorbase::orchestration::{RunEventType, RunStatus};
use authorbase::storage::{verify_snapshot, PaperSource};

#[test]
fn full_run_resolves_every_tier_and_reports_skipped_rows() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    harness.write_raw_rows(
        "part-1.jsonl",
        &[
            "this is not json",
            r#"{"paper_id":"p5","primary_authors":["Solo Author"]}"#,
            r#"{"paper_id":"p1","primary_authors":["Someone Else"],"enrichment_authors":[]}"#,
        ],
    );

    let pipeline = harness.pipeline();
    let summary = pipeline.run_full(&harness.source())?;

    assert_eq!(summary.status, RunStatus::Completed);
    assert_eq!(summary.papers_loaded, 6);
    assert_eq!(summary.papers_processed, 4);
    assert_eq!(summary.papers_skipped, 2);
    assert_eq!(summary.edges_total, 9);
    assert_eq!(summary.match_stats.exact, 3);
    assert_eq!(summary.match_stats.position_disambiguated, 2);
    assert_eq!(summary.match_stats.initialism, 1);
    assert_eq!(summary.match_stats.fuzzy, 1);
    assert_eq!(summary.match_stats.unmatched, 2);
    assert_eq!(summary.match_summary.total_match_attempts, 9);
    assert_eq!(summary.error_count(), 3);
    for reason in [
        PaperIssueReason::UnparseableRow,
        PaperIssueReason::MissingEnrichmentAuthors,
        PaperIssueReason::DuplicatePaper,
    ] {
        assert_eq!(summary.issue_counts.get(&reason), Some(&1), "{reason}");
    }
    assert_eq!(summary.aggregation_gaps, 2);
    assert_eq!(summary.profiles, 5);
    assert_eq!(summary.ranked_authors, 5);
    assert!(summary.hashes.authorships.is_some());
    assert!(summary.hashes.profiles.is_some());
    assert!(summary.hashes.metrics.is_some());

    let snapshot = pipeline.store().load_snapshot()?;
    let p1: Vec<_> = snapshot.edges.iter().filter(|e| e.paper_id == "p1").collect();
    assert_eq!(p1.len(), 2);
    assert_eq!(p1[0].primary_name, "J. Smith");
    assert_eq!(p1[0].tier, MatchTier::Initialism);
    assert_eq!(p1[0].external_id.as_deref(), Some("s1"));
    assert_eq!(p1[1].tier, MatchTier::Exact);

    let p2_ids: Vec<Option<&str>> = snapshot
        .edges
        .iter()
        .filter(|e| e.paper_id == "p2")
        .map(|e| e.external_id.as_deref())
        .collect();
    assert_eq!(p2_ids, vec![Some("wA"), Some("wB"), Some("a1")]);

    let unmatched: Vec<_> = snapshot
        .edges
        .iter()
        .filter(|e| e.tier == MatchTier::Unmatched)
        .collect();
    assert_eq!(unmatched.len(), 2);
    assert!(unmatched.iter().all(|e| e.external_id.is_none()));

    let amy = snapshot
        .profiles
        .iter()
        .find(|p| p.identity == AuthorIdentity::External("a1".into()))
        .expect("Amy Lee profile");
    assert_eq!(amy.paper_count, 3);
    assert_eq!(amy.first_author_count, 1);
    assert_eq!(amy.last_author_count, 2);
    assert_eq!(amy.total_citations, 180);
    assert_eq!(amy.first_publication_year, Some(2015));
    assert_eq!(amy.latest_publication_year, Some(2024));
    assert_eq!(amy.career_length, 10);
    assert_eq!(amy.match_confidence, MatchConfidence::High);

    // "J. Smith" and "John Smyth" both resolved to s1
    let smith = snapshot
        .profiles
        .iter()
        .find(|p| p.identity == AuthorIdentity::External("s1".into()))
        .expect("John Smith profile");
    assert_eq!(smith.paper_count, 2);
    assert_eq!(smith.primary_names, vec!["J. Smith", "John Smyth"]);

    let student = snapshot
        .profiles
        .iter()
        .find(|p| p.identity == AuthorIdentity::Name("Grad Student".into()))
        .expect("unmatched author keeps a name identity");
    assert_eq!(student.paper_count, 2);
    assert_eq!(student.match_confidence, MatchConfidence::Low);

    let amy_metrics = snapshot
        .metrics
        .iter()
        .find(|m| m.identity == AuthorIdentity::External("a1".into()))
        .expect("Amy Lee metrics");
    assert_eq!(amy_metrics.h_index, 2);
    assert_eq!(amy_metrics.highly_cited_papers, 2);
    assert_eq!(amy_metrics.top_cited_papers, 1);
    assert_eq!(amy_metrics.ranks.productivity, 1);

    let papers = harness.source().load_papers()?.papers;
    assert!(verify_snapshot(&snapshot, Some(papers.as_slice())).is_empty());

    let events = pipeline.log().load_events_for(summary.run_id)?;
    assert_eq!(
        events.last().map(|e| e.event_type),
        Some(RunEventType::RunCompleted)
    );
    let recorded = pipeline.log().last_run()?.expect("run summary recorded");
    assert_eq!(recorded.run_id, summary.run_id);
    assert_eq!(recorded.match_stats, summary.match_stats);
    Ok(())
}

#[test]
fn matched_first_policy_reorders_edges() -> Result<()> {
    let harness = IntegrationHarness::new();
    let mut workspace = harness.workspace();
    workspace.config.authorship.order_policy = authorbase::bases::OrderPolicy::MatchedFirst;
    workspace.save_config()?;
    harness.write_papers("part-0.jsonl", &sample_corpus());

    harness.pipeline().run_full(&harness.source())?;
    let edges = harness.store().load_edges()?;
    let p1: Vec<(&str, usize, usize)> = edges
        .iter()
        .filter(|e| e.paper_id == "p1")
        .map(|e| (e.primary_name.as_str(), e.order, e.mention_position))
        .collect();
    // exact pass accepts Amy Lee before the initialism pass reaches J. Smith
    assert_eq!(p1, vec![("Amy Lee", 1, 2), ("J. Smith", 2, 1)]);
    Ok(())
}

#[test]
fn empty_input_directory_commits_empty_relations() -> Result<()> {
    let harness = IntegrationHarness::new();
    std::fs::create_dir_all(harness.papers_dir())?;
    let summary = harness.pipeline().run_full(&harness.source())?;
    assert_eq!(summary.papers_loaded, 0);
    assert_eq!(summary.edges_total, 0);
    assert_eq!(summary.match_summary.total_match_attempts, 0);
    let snapshot = harness.store().load_snapshot()?;
    assert!(snapshot.edges.is_empty());
    assert!(snapshot.profiles.is_empty());
    assert!(snapshot.metrics.is_empty());
    Ok(())
}
