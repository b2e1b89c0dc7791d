use super::support::corpus::sample_corpus;
use super::IntegrationHarness;
use anyhow::Result;
use authorbase::orchestration::RunEventType;
use authorbase::storage::{ChangeSet, JsonlPaperSource};
use std::fs;

#[test]
fn missing_input_fails_before_any_relation_is_written() -> Result<()> {
    let harness = IntegrationHarness::new();
    let pipeline = harness.pipeline();
    let source = JsonlPaperSource::new(harness.workspace_path().join("no-such-dir"));

    let err = pipeline.run_full(&source).unwrap_err();
    assert!(format!("{err:#}").contains("does not exist"));
    assert_eq!(harness.relation_hashes(), [None, None, None]);

    let events = pipeline.log().load_events()?;
    let kinds: Vec<RunEventType> = events.iter().map(|e| e.event_type).collect();
    assert_eq!(kinds, vec![RunEventType::RunStarted, RunEventType::RunFailed]);
    assert!(pipeline.log().load_runs()?.is_empty());
    Ok(())
}

#[test]
fn unresolvable_change_set_leaves_relations_untouched() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    let pipeline = harness.pipeline();
    pipeline.run_full(&harness.source())?;
    let before = harness.relation_hashes();

    let missing = harness.workspace_path().join("missing-changes.json");
    assert!(pipeline
        .run_incremental_from(&harness.source(), &missing)
        .is_err());

    let garbled = harness.workspace_path().join("garbled-changes.json");
    fs::write(&garbled, "{\"paper_ids\": 17}")?;
    assert!(pipeline
        .run_incremental_from(&harness.source(), &garbled)
        .is_err());

    assert_eq!(harness.relation_hashes(), before);
    let failures = pipeline
        .log()
        .load_events()?
        .into_iter()
        .filter(|e| e.event_type == RunEventType::RunFailed)
        .count();
    assert_eq!(failures, 2);
    Ok(())
}

#[test]
fn unreadable_stored_edges_abort_incremental_runs() -> Result<()> {
    let harness = IntegrationHarness::new();
    harness.write_papers("part-0.jsonl", &sample_corpus());
    let pipeline = harness.pipeline();
    pipeline.run_full(&harness.source())?;
    let [_, profiles_before, metrics_before] = harness.relation_hashes();

    fs::write(&harness.workspace().layout.authorships_path, "not json")?;
    let result = pipeline.run_incremental(&harness.source(), &ChangeSet::new(["p1"]));
    assert!(result.is_err());

    let [_, profiles_after, metrics_after] = harness.relation_hashes();
    assert_eq!(profiles_after, profiles_before);
    assert_eq!(metrics_after, metrics_before);
    Ok(())
}
