use agentmem_core::{NewObservation, Observation, PaginatedResult};
use async_trait::async_trait;

use crate::error::StorageError;

/// CRUD operations on observations.
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Insert an observation. Returns the new id.
    async fn create_observation(&self, obs: &NewObservation) -> Result<i64, StorageError>;

    /// Get observation by id.
    async fn get_observation(&self, id: i64) -> Result<Option<Observation>, StorageError>;

    /// Get observations by a list of ids; unknown ids are skipped.
    async fn get_observations_by_ids(&self, ids: &[i64]) -> Result<Vec<Observation>, StorageError>;

    /// All observations of a session in prompt order.
    async fn get_session_observations(
        &self,
        session_id: &str,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Newest observations, optionally for one project.
    async fn get_recent_observations(
        &self,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Paginated listing, newest first.
    async fn list_observations(
        &self,
        project: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedResult<Observation>, StorageError>;

    /// Observations referencing a file path.
    async fn search_by_file(
        &self,
        file_path: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Observation>, StorageError>;

    /// Distinct project names.
    async fn list_projects(&self) -> Result<Vec<String>, StorageError>;
}
