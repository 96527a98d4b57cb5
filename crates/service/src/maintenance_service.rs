use std::path::{Path, PathBuf};
use std::sync::Arc;

use agentmem_core::{
    ConsolidationReport, DEFAULT_BACKFILL_BATCH, EmbeddingStats, Observation, StalenessReport,
    embedded_percentage,
};
use agentmem_embeddings::EmbeddingService;
use agentmem_storage::{ConsolidationOptions, StorageBackend};
use chrono::{DateTime, Utc};

use crate::ServiceError;

/// Caller-invoked batch jobs: backfill, consolidation, staleness.
pub struct MaintenanceService {
    storage: Arc<dyn StorageBackend>,
    embeddings: Arc<EmbeddingService>,
    consolidation_min_group: usize,
}

impl MaintenanceService {
    #[must_use]
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        embeddings: Arc<EmbeddingService>,
        consolidation_min_group: usize,
    ) -> Self {
        Self { storage, embeddings, consolidation_min_group }
    }

    /// Embed up to `batch_size` observations that have no vector yet.
    ///
    /// Rows that fail to embed are skipped and the scan pages further back,
    /// so a run of unembeddable recent rows never hides older ones. Returns
    /// the number of vectors stored.
    pub async fn backfill_embeddings(&self, batch_size: Option<usize>) -> Result<usize, ServiceError> {
        let batch_size = batch_size.unwrap_or(DEFAULT_BACKFILL_BATCH).max(1);
        if !self.embeddings.ensure_ready().await {
            tracing::warn!("embedding backfill skipped, no provider available");
            return Ok(0);
        }
        let model = self.embeddings.provider_name().unwrap_or_default();
        let mut generated = 0usize;
        let mut failed = 0usize;
        let mut cursor = None;
        while generated < batch_size {
            let page = self
                .storage
                .get_observations_without_embeddings(batch_size - generated, cursor)
                .await?;
            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(last.id);
            for obs in &page {
                let Some(vector) = self.embeddings.embed_blocking(obs.embedding_text()).await else {
                    tracing::debug!(id = obs.id, "skipping observation, embedding failed");
                    failed += 1;
                    continue;
                };
                match self.storage.store_embedding(obs.id, &vector, &model).await {
                    Ok(()) => generated += 1,
                    Err(e) => {
                        tracing::warn!(id = obs.id, error = %e, "failed to store embedding");
                        failed += 1;
                    },
                }
            }
        }
        tracing::info!(generated, failed, "embedding backfill finished");
        Ok(generated)
    }

    /// Merge groups of observations that modified the same files.
    pub async fn consolidate(
        &self,
        min_group_size: Option<usize>,
        dry_run: bool,
    ) -> Result<ConsolidationReport, ServiceError> {
        let options = ConsolidationOptions {
            min_group_size: min_group_size.unwrap_or(self.consolidation_min_group).max(2),
            dry_run,
        };
        let report = self.storage.consolidate_observations(options).await?;
        tracing::info!(
            groups = report.groups,
            merged = report.merged,
            removed = report.removed,
            failed = report.failed,
            dry_run,
            "consolidation finished"
        );
        Ok(report)
    }

    /// Flag observations whose modified files changed on disk after creation.
    ///
    /// Relative paths resolve against `root` (or the working directory).
    /// Missing files are counted and skipped. Nothing is deleted.
    pub async fn detect_staleness(&self, root: Option<&Path>) -> Result<StalenessReport, ServiceError> {
        let observations = self.storage.get_fresh_observations_with_files().await?;
        let root = root.map(Path::to_path_buf);
        let checked = observations.len();

        let scan = tokio::task::spawn_blocking(move || scan_for_stale(&observations, root.as_deref()))
            .await?;

        let marked_stale = self.storage.mark_stale(&scan.stale_ids).await?;
        let report = StalenessReport { checked, marked_stale, missing_files: scan.missing_files };
        tracing::info!(
            checked = report.checked,
            marked_stale = report.marked_stale,
            missing_files = report.missing_files,
            "staleness detection finished"
        );
        Ok(report)
    }

    pub async fn embedding_stats(&self) -> Result<EmbeddingStats, ServiceError> {
        let (total, embedded) = self.storage.embedding_counts().await?;
        let available = self.embeddings.ensure_ready().await;
        Ok(EmbeddingStats {
            total,
            embedded,
            percentage: embedded_percentage(embedded, total),
            provider: self.embeddings.provider_name(),
            dimensions: self.embeddings.dimensions(),
            available,
        })
    }

    /// Drop every stored vector so the next backfills re-embed everything.
    pub async fn clear_embeddings(&self) -> Result<usize, ServiceError> {
        let cleared = self.storage.clear_embeddings().await?;
        tracing::info!(cleared, "embeddings cleared");
        Ok(cleared)
    }
}

struct StalenessScan {
    stale_ids: Vec<i64>,
    missing_files: usize,
}

fn scan_for_stale(observations: &[Observation], root: Option<&Path>) -> StalenessScan {
    let mut scan = StalenessScan { stale_ids: Vec::new(), missing_files: 0 };
    for obs in observations {
        let mut stale = false;
        for file in &obs.files_modified {
            match modified_epoch_ms(&resolve(file, root)) {
                Some(mtime) if mtime > obs.created_at_epoch => stale = true,
                Some(_) => {},
                None => scan.missing_files += 1,
            }
        }
        if stale {
            tracing::debug!(id = obs.id, "observation references a file changed since creation");
            scan.stale_ids.push(obs.id);
        }
    }
    scan
}

fn resolve(file: &str, root: Option<&Path>) -> PathBuf {
    let path = Path::new(file);
    match root {
        Some(root) if path.is_relative() => root.join(path),
        _ => path.to_path_buf(),
    }
}

fn modified_epoch_ms(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok()?;
    Some(DateTime::<Utc>::from(modified).timestamp_millis())
}
