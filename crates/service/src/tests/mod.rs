//! Test utilities and module declarations for service tests.

use std::sync::Arc;

use agentmem_core::{MemoryConfig, NewObservation, ObservationType};
use agentmem_embeddings::{EmbeddingService, HashingProvider};
use agentmem_storage::{Storage, StorageBackend};
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use crate::MemoryServices;

pub struct TestEnv {
    pub services: MemoryServices,
    pub storage: Arc<Storage>,
    pub dir: TempDir,
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn test_env(embeddings: EmbeddingService) -> TestEnv {
    let dir = TempDir::new().unwrap();
    let config = MemoryConfig { db_path: dir.path().join("memory.db"), ..MemoryConfig::default() };
    let storage = Arc::new(Storage::from_config(&config).unwrap());
    let backend: Arc<dyn StorageBackend> = storage.clone();
    let services = MemoryServices::from_parts(backend, Arc::new(embeddings), &config);
    TestEnv { services, storage, dir }
}

pub fn hashing() -> EmbeddingService {
    EmbeddingService::with_provider(Arc::new(HashingProvider::default()))
}

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

pub fn new_observation(project: &str, kind: ObservationType, title: &str) -> NewObservation {
    NewObservation::builder("svc-session", project, kind, title).prompt_number(1).build()
}

mod maintenance_tests;
mod observation_tests;
