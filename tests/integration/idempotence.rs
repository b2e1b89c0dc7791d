use super::support::corpus::sample_corpus;
use super::IntegrationHarness;
use anyhow::Result;
use authorbase::profiles::{aggregate_profiles, index_paper_stats};
use authorbase::storage::{ChangeSet, PaperSource};

#[test]
fn rerunning_over_unchanged_input_is_byte_identical() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    let pipeline = harness.pipeline();

    let first = pipeline.run_full(&harness.source())?;
    let after_first = harness.relation_hashes();
    let second = pipeline.run_full(&harness.source())?;
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(first.hashes, second.hashes);
    assert_eq!(harness.relation_hashes(), after_first);

    let incremental = pipeline.run_incremental(&harness.source(), &ChangeSet::default())?;
    assert_eq!(incremental.papers_processed, 0);
    assert_eq!(incremental.hashes, first.hashes);
    Ok(())
}

#[test]
fn aggregating_twice_gives_identical_rows() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    harness.pipeline().run_full(&harness.source())?;

    let edges = harness.store().load_edges()?;
    let papers = harness.source().load_papers()?.papers;
    let stats = index_paper_stats(&papers);
    let settings = harness.workspace().config.metrics;

    let once = serde_json::to_vec(&aggregate_profiles(&edges, &stats, &settings).profiles)?;
    let twice = serde_json::to_vec(&aggregate_profiles(&edges, &stats, &settings).profiles)?;
    assert_eq!(once, twice);
    Ok(())
}
