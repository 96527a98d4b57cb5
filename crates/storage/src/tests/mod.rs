//! Test utilities and module declarations for storage tests.

use agentmem_core::{NewObservation, ObservationType};
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;

use crate::Storage;

#[expect(clippy::unwrap_used, reason = "test code")]
pub fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let storage = Storage::new(&db_path).unwrap();
    (storage, temp_dir)
}

pub fn create_test_observation(project: &str, title: &str) -> NewObservation {
    NewObservation::builder("test-session", project, ObservationType::Discovery, title)
        .subtitle("Test subtitle")
        .text("Test body")
        .narrative("Test narrative")
        .facts(vec!["fact1".to_owned(), "fact2".to_owned()])
        .concepts(vec!["testing".to_owned()])
        .files_read(vec!["src/lib.rs".to_owned()])
        .files_modified(vec!["src/main.rs".to_owned()])
        .prompt_number(1)
        .build()
}

/// Fixed point in time offset by `minutes`, for deterministic ordering.
#[expect(clippy::unwrap_used, reason = "test code")]
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-06-01T12:00:00Z").unwrap().with_timezone(&Utc)
        + Duration::minutes(minutes)
}

mod consolidation_tests;
mod migration_tests;
mod observation_tests;
