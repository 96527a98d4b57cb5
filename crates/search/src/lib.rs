//! Hybrid search combining full-text rank and vector similarity.
//!
//! Candidates come from two retrieval paths:
//! 1. FTS5 lexical matches with their raw bm25 rank
//! 2. cosine-similarity matches over stored embeddings (when a provider loads)
//!
//! Both are merged by observation id and ranked with the weighted signals in
//! [`scoring`]. An empty query switches to context mode, which ranks recent
//! observations by freshness and project.

#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

pub mod scoring;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use agentmem_core::{
    CANDIDATE_MULTIPLIER, HybridHit, MatchSource, Observation, SearchConfig, SearchFilters,
    SignalBreakdown, VectorMatch, now_epoch_ms, validation::clamp_limit,
};
use agentmem_embeddings::EmbeddingService;
use agentmem_storage::StorageBackend;
use anyhow::Result;
use tokio::task::JoinSet;

use crate::scoring::{
    ScoringPreset, composite, hybrid_boost, normalize_lexical_ranks, project_match,
    recency_score, semantic_score, staleness_penalty,
};

/// What each retrieval path contributed for one observation.
struct Candidate {
    observation: Observation,
    similarity: Option<f32>,
    /// `Some(rank)` when found lexically; the inner `None` is a substring-fallback hit.
    lexical_rank: Option<Option<f64>>,
}

/// High-level search facade over [`StorageBackend`] and [`EmbeddingService`].
pub struct HybridSearch {
    storage: Arc<dyn StorageBackend>,
    embeddings: Arc<EmbeddingService>,
    config: SearchConfig,
    access_updates: Mutex<JoinSet<()>>,
}

impl HybridSearch {
    #[must_use]
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        embeddings: Arc<EmbeddingService>,
        config: SearchConfig,
    ) -> Self {
        Self { storage, embeddings, config, access_updates: Mutex::new(JoinSet::new()) }
    }

    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Rank observations for `query`. `project` raises matching candidates
    /// but does not exclude others; with an empty query it scopes context mode.
    pub async fn search(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<HybridHit>> {
        let limit = clamp_limit(Some(limit));
        if query.trim().is_empty() {
            return self.context(project, limit).await;
        }
        let candidate_limit = limit.saturating_mul(CANDIDATE_MULTIPLIER);
        let now = now_epoch_ms();

        let mut candidates: BTreeMap<i64, Candidate> = BTreeMap::new();

        let filters = SearchFilters { limit: candidate_limit, ..SearchFilters::default() };
        for hit in self.storage.search_observations(query, &filters).await? {
            candidates.insert(
                hit.observation.id,
                Candidate {
                    observation: hit.observation,
                    similarity: None,
                    lexical_rank: Some(hit.rank),
                },
            );
        }

        let matches = self.vector_candidates(query, candidate_limit).await;
        let missing: Vec<i64> = matches
            .iter()
            .map(|m| m.observation_id)
            .filter(|id| !candidates.contains_key(id))
            .collect();
        let mut vector_only: BTreeMap<i64, Observation> = if missing.is_empty() {
            BTreeMap::new()
        } else {
            self.storage
                .get_observations_by_ids(&missing)
                .await?
                .into_iter()
                .map(|o| (o.id, o))
                .collect()
        };
        for m in matches {
            if let Some(candidate) = candidates.get_mut(&m.observation_id) {
                candidate.similarity = Some(m.similarity);
            } else if let Some(observation) = vector_only.remove(&m.observation_id) {
                candidates.insert(
                    m.observation_id,
                    Candidate { observation, similarity: Some(m.similarity), lexical_rank: None },
                );
            }
        }

        let ranked: Vec<f64> =
            candidates.values().filter_map(|c| c.lexical_rank.flatten()).collect();
        let normalized = normalize_lexical_ranks(&ranked);
        let mut rank_iter = normalized.into_iter();

        let mut hits = Vec::with_capacity(candidates.len());
        for candidate in candidates.into_values() {
            let lexical = match candidate.lexical_rank {
                Some(Some(_)) => rank_iter.next().unwrap_or(1.0),
                Some(None) => 1.0,
                None => 0.0,
            };
            let obs = candidate.observation;
            let signals = SignalBreakdown {
                semantic: candidate.similarity.map_or(0.0, semantic_score),
                lexical,
                recency: recency_score(
                    Some(obs.created_at_epoch),
                    now,
                    self.config.recency_half_life_hours,
                ),
                access_recency: recency_score(
                    obs.last_accessed_epoch,
                    now,
                    self.config.access_half_life_hours,
                ),
                project_match: project_match(&obs.project, project),
            };

            let (source, mut score) =
                match (candidate.similarity.is_some(), candidate.lexical_rank.is_some()) {
                    (true, true) => (
                        MatchSource::Hybrid,
                        hybrid_boost(
                            composite(&signals, ScoringPreset::Search),
                            self.config.hybrid_boost,
                        ),
                    ),
                    (true, false) => {
                        (MatchSource::Vector, composite(&signals, ScoringPreset::Search))
                    },
                    _ => (MatchSource::Keyword, composite(&signals, ScoringPreset::Search)),
                };
            if self.config.staleness_penalty {
                score = staleness_penalty(score, obs.is_stale);
            }
            hits.push(HybridHit { observation: obs, score, source, signals });
        }

        Ok(self.finish(hits, limit))
    }

    /// Vector-only ranking, restricted to `project` when given. Empty when
    /// embeddings are unavailable.
    pub async fn semantic(
        &self,
        query: &str,
        project: Option<&str>,
        limit: usize,
    ) -> Result<Vec<HybridHit>> {
        let limit = clamp_limit(Some(limit));
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let Some(query_vec) = self.embeddings.embed_blocking(query.to_owned()).await else {
            return Ok(Vec::new());
        };
        let matches = self
            .storage
            .vector_search(&query_vec, project, limit, self.config.vector_threshold)
            .await?;
        let ids: Vec<i64> = matches.iter().map(|m| m.observation_id).collect();
        let mut rows: BTreeMap<i64, Observation> = self
            .storage
            .get_observations_by_ids(&ids)
            .await?
            .into_iter()
            .map(|o| (o.id, o))
            .collect();
        let now = now_epoch_ms();
        let hits = matches
            .into_iter()
            .filter_map(|m| {
                let obs = rows.remove(&m.observation_id)?;
                let signals = SignalBreakdown {
                    semantic: semantic_score(m.similarity),
                    recency: recency_score(
                        Some(obs.created_at_epoch),
                        now,
                        self.config.recency_half_life_hours,
                    ),
                    access_recency: recency_score(
                        obs.last_accessed_epoch,
                        now,
                        self.config.access_half_life_hours,
                    ),
                    project_match: project_match(&obs.project, project),
                    ..SignalBreakdown::default()
                };
                Some(HybridHit {
                    observation: obs,
                    score: signals.semantic,
                    source: MatchSource::Vector,
                    signals,
                })
            })
            .collect();
        Ok(self.finish(hits, limit))
    }

    /// Context mode: recent observations ranked by freshness and project.
    async fn context(&self, project: Option<&str>, limit: usize) -> Result<Vec<HybridHit>> {
        let now = now_epoch_ms();
        let recent = self.storage.get_recent_observations(project, limit).await?;
        let hits = recent
            .into_iter()
            .map(|obs| {
                let signals = SignalBreakdown {
                    recency: recency_score(
                        Some(obs.created_at_epoch),
                        now,
                        self.config.recency_half_life_hours,
                    ),
                    access_recency: recency_score(
                        obs.last_accessed_epoch,
                        now,
                        self.config.access_half_life_hours,
                    ),
                    project_match: project_match(&obs.project, project),
                    ..SignalBreakdown::default()
                };
                let mut score = composite(&signals, ScoringPreset::Context);
                if self.config.staleness_penalty {
                    score = staleness_penalty(score, obs.is_stale);
                }
                HybridHit { observation: obs, score, source: MatchSource::Recent, signals }
            })
            .collect();
        Ok(self.finish(hits, limit))
    }

    /// Vector matches for `query`, or nothing when embeddings are unavailable or fail.
    async fn vector_candidates(&self, query: &str, limit: usize) -> Vec<VectorMatch> {
        let Some(query_vec) = self.embeddings.embed_blocking(query.to_owned()).await else {
            tracing::debug!("query embedding unavailable, ranking lexical candidates only");
            return Vec::new();
        };
        match self
            .storage
            .vector_search(&query_vec, None, limit, self.config.vector_threshold)
            .await
        {
            Ok(matches) => matches,
            Err(e) => {
                tracing::warn!(error = %e, "vector search failed, ranking lexical candidates only");
                Vec::new()
            },
        }
    }

    /// Sort, truncate and record access for the returned ids.
    fn finish(&self, mut hits: Vec<HybridHit>, limit: usize) -> Vec<HybridHit> {
        hits.sort_by(compare_hits);
        hits.truncate(limit);
        self.record_access(&hits);
        hits
    }

    /// Best-effort `last_accessed_epoch` update on a background task.
    fn record_access(&self, hits: &[HybridHit]) {
        if hits.is_empty() {
            return;
        }
        let ids: Vec<i64> = hits.iter().map(|h| h.observation.id).collect();
        let storage = Arc::clone(&self.storage);
        let update = async move {
            if let Err(e) = storage.touch_observations(&ids, now_epoch_ms()).await {
                tracing::warn!(count = ids.len(), error = %e, "failed to record observation access");
            }
        };
        match self.access_updates.lock() {
            Ok(mut pending) => {
                while pending.try_join_next().is_some() {}
                pending.spawn(update);
            },
            Err(_) => {
                tokio::spawn(update);
            },
        }
    }

    /// Wait for outstanding access updates. Short-lived processes call this
    /// before exiting; long-running ones never need to.
    pub async fn flush_access_updates(&self) {
        let mut pending = match self.access_updates.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return,
        };
        while pending.join_next().await.is_some() {}
    }
}

/// Score descending, then creation epoch descending, then id descending.
fn compare_hits(a: &HybridHit, b: &HybridHit) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.observation.created_at_epoch.cmp(&a.observation.created_at_epoch))
        .then_with(|| b.observation.id.cmp(&a.observation.id))
}
