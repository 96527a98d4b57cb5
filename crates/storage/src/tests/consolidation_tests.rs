#![expect(clippy::unwrap_used, reason = "test code")]

use agentmem_core::{
    CONSOLIDATION_DELIMITER, MAX_OBSERVATION_TEXT_BYTES, NewObservation, ObservationType,
    SearchFilters,
};

use super::{at_minute, create_test_storage};
use crate::{ConsolidationOptions, Storage};

fn build_step(storage: &Storage, minute: i64, files: &[&str], text: &str) -> i64 {
    let obs = NewObservation::builder("s", "acme", ObservationType::Command, "Ran build")
        .text(text)
        .files_modified(files.iter().map(|f| (*f).to_owned()).collect())
        .created_at(at_minute(minute))
        .build();
    storage.create_observation(&obs).unwrap()
}

#[test]
fn test_five_duplicates_merge_into_newest() {
    let (storage, _temp_dir) = create_test_storage();
    let ids: Vec<i64> =
        (0..5).map(|m| build_step(&storage, m, &["build.sh"], &format!("run {m}"))).collect();
    let survivor = ids[4];
    storage.store_embedding(survivor, &[1.0, 0.0], "test").unwrap();
    storage.store_embedding(ids[0], &[0.0, 1.0], "test").unwrap();

    let report = storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    assert_eq!(report.groups, 1);
    assert_eq!(report.merged, 1);
    assert_eq!(report.removed, 4);
    assert_eq!(report.failed, 0);

    let kept = storage.get_observation(survivor).unwrap().unwrap();
    assert_eq!(kept.title, "Ran build (x5)");
    let text = kept.text.unwrap();
    assert!(text.starts_with("run 4"));
    assert_eq!(text.matches(CONSOLIDATION_DELIMITER).count(), 4);
    for id in &ids[..4] {
        assert!(storage.get_observation(*id).unwrap().is_none());
    }
    // survivor's embedding dropped for re-embedding, removed rows cascaded
    assert_eq!(storage.embedding_counts().unwrap(), (1, 0));
    // full-text index follows the merge
    let hits = storage.search_observations("Ran", &SearchFilters::default()).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn test_file_order_does_not_split_groups() {
    let (storage, _temp_dir) = create_test_storage();
    build_step(&storage, 0, &["a.rs", "b.rs"], "x");
    build_step(&storage, 1, &["b.rs", "a.rs"], "y");
    build_step(&storage, 2, &["a.rs", "b.rs", "a.rs"], "z");

    let report = storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    assert_eq!(report.merged, 1);
    assert_eq!(report.removed, 2);
}

#[test]
fn test_groups_below_minimum_and_without_files_are_left_alone() {
    let (storage, _temp_dir) = create_test_storage();
    build_step(&storage, 0, &["a.rs"], "x");
    build_step(&storage, 1, &["a.rs"], "y");
    for m in 2..6 {
        build_step(&storage, m, &[], "no files");
    }

    let report = storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    assert_eq!(report, agentmem_core::ConsolidationReport::default());
    assert_eq!(storage.get_stats().unwrap().observations, 6);
}

#[test]
fn test_distinct_projects_and_types_do_not_group() {
    let (storage, _temp_dir) = create_test_storage();
    for (project, kind) in [
        ("acme", ObservationType::Command),
        ("acme", ObservationType::Command),
        ("other", ObservationType::Command),
        ("acme", ObservationType::Bugfix),
    ] {
        let obs = NewObservation::builder("s", project, kind, "t")
            .files_modified(vec!["same.rs".to_owned()])
            .build();
        storage.create_observation(&obs).unwrap();
    }

    let report = storage
        .consolidate_observations(ConsolidationOptions { min_group_size: 2, dry_run: false })
        .unwrap();

    assert_eq!(report.merged, 1);
    assert_eq!(report.removed, 1);
}

#[test]
fn test_dry_run_reports_without_mutation() {
    let (storage, _temp_dir) = create_test_storage();
    for m in 0..4 {
        build_step(&storage, m, &["deploy.sh"], "deploy");
    }

    let report = storage
        .consolidate_observations(ConsolidationOptions { min_group_size: 3, dry_run: true })
        .unwrap();

    assert_eq!(report.merged, 1);
    assert_eq!(report.removed, 3);
    assert_eq!(storage.get_stats().unwrap().observations, 4);
}

#[test]
fn test_identical_bodies_are_not_repeated_and_title_count_accumulates() {
    let (storage, _temp_dir) = create_test_storage();
    let obs = NewObservation::builder("s", "acme", ObservationType::Command, "Ran build (x2)")
        .text("same output")
        .files_modified(vec!["build.sh".to_owned()])
        .created_at(at_minute(10))
        .build();
    let survivor = storage.create_observation(&obs).unwrap();
    build_step(&storage, 0, &["build.sh"], "same output");
    build_step(&storage, 1, &["build.sh"], "  ");

    storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    let kept = storage.get_observation(survivor).unwrap().unwrap();
    assert_eq!(kept.title, "Ran build (x4)");
    assert_eq!(kept.text.as_deref(), Some("same output"));
}

#[test]
fn test_earlier_merge_count_carries_into_newer_survivor() {
    let (storage, _temp_dir) = create_test_storage();
    for m in 0..3 {
        build_step(&storage, m, &["build.sh"], &format!("run {m}"));
    }
    storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    build_step(&storage, 10, &["build.sh"], "run 10");
    let newest = build_step(&storage, 11, &["build.sh"], "run 11");
    let report = storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    assert_eq!(report.removed, 2);
    let kept = storage.get_observation(newest).unwrap().unwrap();
    assert_eq!(kept.title, "Ran build (x5)");
}

#[test]
fn test_merged_text_is_capped() {
    let (storage, _temp_dir) = create_test_storage();
    let chunk = "é".repeat(MAX_OBSERVATION_TEXT_BYTES / 4);
    for m in 0..3 {
        build_step(&storage, m, &["big.rs"], &format!("{m}{chunk}"));
    }

    storage.consolidate_observations(ConsolidationOptions::default()).unwrap();

    let kept = storage.get_recent_observations(Some("acme"), 1).unwrap().remove(0);
    assert!(kept.text.unwrap().len() <= MAX_OBSERVATION_TEXT_BYTES);
}
