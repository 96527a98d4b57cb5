use std::fs;

use agentmem_core::{NewObservation, ObservationType};
use agentmem_embeddings::EmbeddingService;

use super::{at, hashing, new_observation, test_env};

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn backfill_embeds_missing_rows_up_to_batch() {
    let env = test_env(hashing());
    for title in ["alpha", "beta", "gamma"] {
        env.storage.create_observation(&new_observation("acme", ObservationType::Manual, title)).unwrap();
    }

    assert_eq!(env.services.maintenance.backfill_embeddings(Some(2)).await.unwrap(), 2);
    assert_eq!(env.services.maintenance.backfill_embeddings(Some(10)).await.unwrap(), 1);
    assert_eq!(env.services.maintenance.backfill_embeddings(None).await.unwrap(), 0);

    let stats = env.services.maintenance.embedding_stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.embedded, 3);
    assert!((stats.percentage - 100.0).abs() < f64::EPSILON);
    assert_eq!(stats.provider.as_deref(), Some("hash"));
    assert_eq!(stats.dimensions, Some(agentmem_core::EMBEDDING_DIMENSION));
    assert!(stats.available);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn backfill_pages_past_rows_that_cannot_be_embedded() {
    let env = test_env(hashing());
    let older = env
        .storage
        .create_observation(&new_observation("acme", ObservationType::Manual, "older row"))
        .unwrap();
    // Nothing the hashing provider can tokenize.
    for _ in 0..3 {
        let blank = NewObservation::builder("s-1", "acme", ObservationType::Manual, "!!!").build();
        env.storage.create_observation(&blank).unwrap();
    }

    assert_eq!(env.services.maintenance.backfill_embeddings(Some(1)).await.unwrap(), 1);
    assert!(env.storage.get_embedding(older).unwrap().is_some());
    assert_eq!(env.services.maintenance.backfill_embeddings(Some(1)).await.unwrap(), 0);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn backfill_without_provider_generates_nothing() {
    let env = test_env(EmbeddingService::unavailable());
    env.storage.create_observation(&new_observation("acme", ObservationType::Manual, "x")).unwrap();
    assert_eq!(env.services.maintenance.backfill_embeddings(None).await.unwrap(), 0);

    let stats = env.services.maintenance.embedding_stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.embedded, 0);
    assert!(stats.percentage.abs() < f64::EPSILON);
    assert!(!stats.available);
    assert!(stats.provider.is_none());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn embedding_stats_on_empty_store() {
    let env = test_env(EmbeddingService::unavailable());
    let stats = env.services.maintenance.embedding_stats().await.unwrap();
    assert_eq!(stats.total, 0);
    assert!(stats.percentage.abs() < f64::EPSILON);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn consolidation_merges_five_build_commands() {
    let env = test_env(EmbeddingService::unavailable());
    for minute in 0..5 {
        let obs = NewObservation::builder("s-1", "acme", ObservationType::Command, "Ran build")
            .text(format!("build output {minute}"))
            .files_modified(vec!["build.sh".to_owned()])
            .created_at(at(&format!("2024-06-01T12:0{minute}:00Z")))
            .build();
        env.services.observations.create_observation(&obs).await.unwrap();
    }

    let dry = env.services.maintenance.consolidate(Some(3), true).await.unwrap();
    assert_eq!((dry.merged, dry.removed), (1, 4));
    assert_eq!(env.services.search.stats().await.unwrap().observations, 5);

    let report = env.services.maintenance.consolidate(None, false).await.unwrap();
    assert_eq!(report.merged, 1);
    assert_eq!(report.removed, 4);
    assert_eq!(report.failed, 0);

    let remaining = env.services.search.list_observations(Some("acme"), 0, None).await.unwrap();
    assert_eq!(remaining.items.len(), 1);
    assert!(remaining.items[0].title.contains("x5"));
    let text = remaining.items[0].text.as_deref().unwrap();
    for minute in 0..5 {
        assert!(text.contains(&format!("build output {minute}")));
    }
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn touched_file_marks_observation_stale_and_halves_score() {
    let env = test_env(hashing());
    let workspace = env.dir.path().join("workspace");
    fs::create_dir_all(&workspace).unwrap();
    fs::write(workspace.join("parser.rs"), "fn parse() {}").unwrap();

    // Created long before the file's mtime.
    let touched = NewObservation::builder("s-1", "acme", ObservationType::Refactor, "parser cleanup")
        .files_modified(vec!["parser.rs".to_owned()])
        .created_at(at("2024-06-01T12:00:00Z"))
        .build();
    // Same content, no file reference, so never checked.
    let fresh = NewObservation::builder("s-1", "acme", ObservationType::Refactor, "parser cleanup")
        .created_at(at("2024-06-01T12:00:00Z"))
        .build();
    // Only read the file, so a later edit does not invalidate it.
    let read_only = NewObservation::builder("s-1", "acme", ObservationType::FileRead, "read parser")
        .files_read(vec!["parser.rs".to_owned()])
        .created_at(at("2024-06-01T12:00:00Z"))
        .build();
    // Newer than any mtime the test can produce.
    let future = NewObservation::builder("s-1", "acme", ObservationType::Refactor, "future note")
        .files_modified(vec!["parser.rs".to_owned(), "gone.rs".to_owned()])
        .created_at(at("2999-01-01T00:00:00Z"))
        .build();

    let touched_id = env.services.observations.create_observation(&touched).await.unwrap();
    let fresh_id = env.services.observations.create_observation(&fresh).await.unwrap();
    let future_id = env.services.observations.create_observation(&future).await.unwrap();
    let read_only_id = env.services.observations.create_observation(&read_only).await.unwrap();

    let report = env.services.maintenance.detect_staleness(Some(&workspace)).await.unwrap();
    assert_eq!(report.checked, 2);
    assert_eq!(report.marked_stale, 1);
    assert_eq!(report.missing_files, 1);

    assert!(env.storage.get_observation(touched_id).unwrap().unwrap().is_stale);
    assert!(!env.storage.get_observation(future_id).unwrap().unwrap().is_stale);
    assert!(!env.storage.get_observation(read_only_id).unwrap().unwrap().is_stale);

    // Second run checks only the remaining fresh row.
    let again = env.services.maintenance.detect_staleness(Some(&workspace)).await.unwrap();
    assert_eq!(again.checked, 1);
    assert_eq!(again.marked_stale, 0);

    env.services.maintenance.backfill_embeddings(None).await.unwrap();
    let hits = env.services.search.hybrid_search("parser cleanup", Some("acme"), None).await.unwrap();
    let stale_score = hits.iter().find(|h| h.observation.id == touched_id).unwrap().score;
    let fresh_score = hits.iter().find(|h| h.observation.id == fresh_id).unwrap().score;
    assert!((stale_score - fresh_score * 0.5).abs() < 1e-12);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn clear_embeddings_resets_coverage() {
    let env = test_env(hashing());
    env.storage.create_observation(&new_observation("acme", ObservationType::Manual, "x")).unwrap();
    env.services.maintenance.backfill_embeddings(None).await.unwrap();
    assert_eq!(env.services.maintenance.clear_embeddings().await.unwrap(), 1);
    assert_eq!(env.services.maintenance.embedding_stats().await.unwrap().embedded, 0);
}
