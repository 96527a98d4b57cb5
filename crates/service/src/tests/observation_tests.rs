use agentmem_core::ObservationType;
use agentmem_embeddings::EmbeddingService;

use super::{hashing, new_observation, test_env};

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn create_then_get_returns_inputs() {
    let env = test_env(EmbeddingService::unavailable());
    let input = agentmem_core::NewObservation::builder(
        "s-1",
        "acme",
        ObservationType::Bugfix,
        "Fixed race in pool init",
    )
    .subtitle("pool.rs")
    .text("details...")
    .narrative("Two callers initialized the pool concurrently.")
    .facts(vec!["init is now guarded".to_owned()])
    .concepts(vec!["concurrency".to_owned()])
    .files_modified(vec!["src/pool.rs".to_owned()])
    .prompt_number(3)
    .build();

    let first = env.services.observations.create_observation(&input).await.unwrap();
    let second = env.services.observations.create_observation(&input).await.unwrap();
    assert!(second > first);

    let stored = env.services.observations.get_observation(first).await.unwrap().unwrap();
    assert_eq!(stored.project, "acme");
    assert_eq!(stored.observation_type, ObservationType::Bugfix);
    assert_eq!(stored.title, input.title);
    assert_eq!(stored.subtitle, input.subtitle);
    assert_eq!(stored.text, input.text);
    assert_eq!(stored.narrative, input.narrative);
    assert_eq!(stored.facts, input.facts);
    assert_eq!(stored.concepts, input.concepts);
    assert_eq!(stored.files_modified, input.files_modified);
    assert_eq!(stored.prompt_number, 3);
    assert_eq!(stored.created_at_epoch, input.created_at_epoch());
    assert!(!stored.is_stale);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn invalid_observation_is_rejected_before_storage() {
    let env = test_env(EmbeddingService::unavailable());
    let input = new_observation("acme", ObservationType::Manual, "   ");
    let err = env.services.observations.create_observation(&input).await.unwrap_err();
    assert!(err.is_invalid_input());
    assert!(env.services.search.list_projects().await.unwrap().is_empty());

    let bad_project = new_observation("../etc", ObservationType::Manual, "title");
    let err = env.services.observations.create_observation(&bad_project).await.unwrap_err();
    assert!(err.is_invalid_input());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn background_task_stores_embedding() {
    let env = test_env(hashing());
    let input = new_observation("acme", ObservationType::Feature, "Added export command");
    let (id, handle) =
        env.services.observations.create_observation_tracked(&input).await.unwrap();
    assert!(handle.await.unwrap());

    let vector = env.storage.get_embedding(id).unwrap().unwrap();
    assert_eq!(vector.len(), agentmem_core::EMBEDDING_DIMENSION);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unavailable_embeddings_never_fail_the_write() {
    let env = test_env(EmbeddingService::unavailable());
    let input = new_observation("acme", ObservationType::Command, "cargo fmt");
    let (id, handle) =
        env.services.observations.create_observation_tracked(&input).await.unwrap();
    assert!(!handle.await.unwrap());
    assert!(env.services.observations.get_observation(id).await.unwrap().is_some());
    assert!(env.storage.get_embedding(id).unwrap().is_none());
}
