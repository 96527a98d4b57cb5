//! Vector store: one embedding blob per observation, searched by linear scan.

use std::cmp::Ordering;

use agentmem_core::{Observation, VectorMatch, cosine_similarity};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, params};
use zerocopy::IntoBytes as _;
use zerocopy::byteorder::little_endian::F32;

use super::observations::OBSERVATION_COLUMNS;
use super::{Storage, get_conn, log_row_error};
use crate::error::Result;

/// Serialize a vector as little-endian f32 bytes.
pub(crate) fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    let le: Vec<F32> = embedding.iter().map(|&x| F32::new(x)).collect();
    le.as_bytes().to_vec()
}

/// Inverse of [`encode_embedding`]. `None` when the blob length is not a
/// multiple of four.
pub(crate) fn decode_embedding(blob: &[u8]) -> Option<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return None;
    }
    Some(
        blob.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

impl Storage {
    /// Store (or replace) the embedding of an observation.
    ///
    /// # Errors
    /// Returns error if the observation does not exist or the insert fails.
    pub fn store_embedding(&self, observation_id: i64, embedding: &[f32], model: &str) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        conn.execute(
            "INSERT INTO observation_embeddings (observation_id, embedding, model, dimensions, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)
               ON CONFLICT(observation_id) DO UPDATE SET
                 embedding = excluded.embedding,
                 model = excluded.model,
                 dimensions = excluded.dimensions,
                 created_at = excluded.created_at",
            params![
                observation_id,
                encode_embedding(embedding),
                model,
                embedding.len() as i64,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Stored vector of an observation, if any.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_embedding(&self, observation_id: i64) -> Result<Option<Vec<f32>>> {
        let conn = get_conn(&self.pool)?;
        let blob: Option<Vec<u8>> = conn
            .query_row(
                "SELECT embedding FROM observation_embeddings WHERE observation_id = ?1",
                params![observation_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(blob.as_deref().and_then(decode_embedding))
    }

    /// Remove the embedding of an observation. Returns whether one existed.
    ///
    /// # Errors
    /// Returns error if database delete fails.
    pub fn delete_embedding(&self, observation_id: i64) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        let deleted = conn.execute(
            "DELETE FROM observation_embeddings WHERE observation_id = ?1",
            params![observation_id],
        )?;
        Ok(deleted > 0)
    }

    /// Drop every stored embedding so the next backfill re-embeds everything.
    ///
    /// # Errors
    /// Returns error if database delete fails.
    pub fn clear_embeddings(&self) -> Result<usize> {
        let conn = get_conn(&self.pool)?;
        let deleted = conn.execute("DELETE FROM observation_embeddings", [])?;
        tracing::info!(deleted, "Cleared embeddings");
        Ok(deleted)
    }

    /// Observations with no stored embedding, highest id first. `before_id`
    /// pages past rows a previous page already returned.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn get_observations_without_embeddings(
        &self,
        limit: usize,
        before_id: Option<i64>,
    ) -> Result<Vec<Observation>> {
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {OBSERVATION_COLUMNS}
               FROM observations o
               LEFT JOIN observation_embeddings e ON e.observation_id = o.id
               WHERE e.observation_id IS NULL
                 AND (?2 IS NULL OR o.id < ?2)
               ORDER BY o.id DESC
               LIMIT ?1"
        ))?;
        let results = stmt
            .query_map(params![limit as i64, before_id], Self::row_to_observation)?
            .filter_map(log_row_error)
            .collect();
        Ok(results)
    }

    /// Cosine-similarity scan over stored vectors.
    ///
    /// Vectors whose dimension differs from the query are skipped. Matches
    /// below `threshold` are dropped; the rest are sorted by similarity
    /// (then id) descending and truncated to `limit`.
    ///
    /// # Errors
    /// Returns error if database query fails.
    pub fn vector_search(
        &self,
        query: &[f32],
        project: Option<&str>,
        limit: usize,
        threshold: f32,
    ) -> Result<Vec<VectorMatch>> {
        if query.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let conn = get_conn(&self.pool)?;
        let mut stmt = conn.prepare(
            "SELECT e.observation_id, e.embedding
               FROM observation_embeddings e
               JOIN observations o ON o.id = e.observation_id
               WHERE (?1 IS NULL OR o.project = ?1)",
        )?;
        let rows = stmt
            .query_map(params![project], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))?
            .filter_map(log_row_error);

        let mut skipped = 0usize;
        let mut matches: Vec<VectorMatch> = Vec::new();
        for (observation_id, blob) in rows {
            let Some(similarity) = decode_embedding(&blob)
                .and_then(|stored| cosine_similarity(query, &stored))
            else {
                skipped += 1;
                continue;
            };
            if similarity >= threshold {
                matches.push(VectorMatch { observation_id, similarity });
            }
        }
        if skipped > 0 {
            tracing::debug!(skipped, "Skipped embeddings with mismatched dimensions");
        }

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.observation_id.cmp(&a.observation_id))
        });
        matches.truncate(limit);
        Ok(matches)
    }
}
