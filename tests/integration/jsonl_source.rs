use super::IntegrationHarness;
use anyhow::Result;
use authorbase::models::{AuthorIdentity, MatchTier};
use authorbase::storage::PaperSource;

const SEMANTIC_SCHOLAR_ROWS: &[&str] = &[
    r#"{"paper_id":"conf/x/LeeC20","title":"Graph Things","primary_authors":["Amy Lee","Bo Chen"],"enrichment_authors":[{"name":"Amy Lee","authorId":"42"},{"name":"Bo Chen","authorId":null}],"citationCount":7,"influentialCitationCount":2,"year":2020}"#,
    r#"{"paper_id":"conf/x/Lee22","title":"More Graphs","primary_authors":["Amy Lee"],"enrichment_authors":[{"name":"Amy Lee","authorId":"42"}],"citationCount":3,"influentialCitationCount":1,"year":2022}"#,
];

#[test]
fn enrichment_rows_in_upstream_shape_flow_through_the_pipeline() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_raw_rows("2020.jsonl", &SEMANTIC_SCHOLAR_ROWS[..1]);
    harness.write_raw_rows("2022.jsonl", &SEMANTIC_SCHOLAR_ROWS[1..]);

    let batch = harness.source().load_papers()?;
    assert_eq!(batch.papers.len(), 2);
    assert!(batch.issues.is_empty());
    let bo = &batch.papers[0]
        .enrichment_authors
        .as_ref()
        .expect("enrichment list present")[1];
    assert_eq!(bo.external_id, None);

    harness.pipeline().run_full(&harness.source())?;
    let snapshot = harness.store().load_snapshot()?;

    let bo_edge = snapshot
        .edges
        .iter()
        .find(|e| e.primary_name == "Bo Chen")
        .expect("Bo Chen edge");
    // matched by name, but there is no id to carry
    assert_eq!(bo_edge.tier, MatchTier::Exact);
    assert_eq!(bo_edge.external_id, None);

    let amy = snapshot
        .profiles
        .iter()
        .find(|p| p.identity == AuthorIdentity::External("42".into()))
        .expect("Amy Lee profile");
    assert_eq!(amy.paper_count, 2);
    assert_eq!(amy.total_citations, 10);
    assert_eq!(amy.total_influential_citations, 3);
    assert_eq!(amy.career_length, 3);

    let bo = snapshot
        .profiles
        .iter()
        .find(|p| p.identity == AuthorIdentity::Name("Bo Chen".into()))
        .expect("Bo Chen falls back to a name identity");
    assert_eq!(bo.external_names, vec!["Bo Chen"]);
    Ok(())
}

#[test]
fn unreadable_rows_are_counted_not_fatal() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_raw_rows(
        "mixed.jsonl",
        &[SEMANTIC_SCHOLAR_ROWS[0], "{\"paper_id\": ", SEMANTIC_SCHOLAR_ROWS[1]],
    );
    let summary = harness.pipeline().run_full(&harness.source())?;
    assert_eq!(summary.papers_loaded, 2);
    assert_eq!(summary.papers_processed, 2);
    assert_eq!(summary.error_count(), 1);
    assert_eq!(summary.issues[0].location.as_deref(), Some("mixed.jsonl:2"));
    Ok(())
}

#[test]
fn invalid_utf8_row_is_skipped_not_fatal() -> Result<()> {
    let harness = IntegrationHarness::new();
    let dir = harness.papers_dir();
    std::fs::create_dir_all(&dir)?;
    let mut bytes = SEMANTIC_SCHOLAR_ROWS[0].as_bytes().to_vec();
    bytes.extend_from_slice(b"\n{\"paper_id\":\"bad\xff\"}\n");
    bytes.extend_from_slice(SEMANTIC_SCHOLAR_ROWS[1].as_bytes());
    std::fs::write(dir.join("part-0.jsonl"), bytes)?;

    let summary = harness.pipeline().run_full(&harness.source())?;
    assert_eq!(summary.papers_loaded, 2);
    assert_eq!(summary.papers_processed, 2);
    assert_eq!(summary.error_count(), 1);
    assert_eq!(summary.issues[0].location.as_deref(), Some("part-0.jsonl:2"));
    assert!(harness.relation_hashes().iter().all(Option::is_some));
    Ok(())
}
