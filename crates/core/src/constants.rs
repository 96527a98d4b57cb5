//! Shared constants for agentmem.
//!
//! Centralizes limits and tuning defaults used by more than one crate.

/// Maximum number of results for any query.
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Default number of results when limit is not specified by the caller.
pub const DEFAULT_QUERY_LIMIT: usize = 20;

/// Maximum number of IDs in a batch lookup.
pub const MAX_BATCH_IDS: usize = 500;

/// Maximum observation/summary title length, in characters.
pub const MAX_TITLE_CHARS: usize = 500;

/// Maximum observation free-text field size, in bytes.
pub const MAX_OBSERVATION_TEXT_BYTES: usize = 100 * 1024;

/// Maximum size of each summary field, in bytes.
pub const MAX_SUMMARY_FIELD_BYTES: usize = 50 * 1024;

/// Maximum project name length, in characters.
pub const MAX_PROJECT_NAME_CHARS: usize = 200;

/// Embedding vector dimension (all-MiniLM-L6-v2).
pub const EMBEDDING_DIMENSION: usize = 384;

/// Embedding input is truncated to this many characters.
pub const EMBEDDING_INPUT_MAX_CHARS: usize = 2000;

/// Full-text query input cap, in characters.
pub const FTS_MAX_QUERY_CHARS: usize = 10_000;

/// Full-text query token cap.
pub const FTS_MAX_TOKENS: usize = 100;

/// Minimum cosine similarity for a vector candidate.
pub const DEFAULT_VECTOR_THRESHOLD: f32 = 0.3;

/// Vector and lexical candidate pools are `limit * CANDIDATE_MULTIPLIER`.
pub const CANDIDATE_MULTIPLIER: usize = 2;

/// Multiplier for results found by both lexical and vector search.
pub const DEFAULT_HYBRID_BOOST: f64 = 1.15;

/// Upper bound on a boosted score.
pub const HYBRID_BOOST_CAP: f64 = 1.0;

/// Half-life for creation-time recency decay.
pub const DEFAULT_RECENCY_HALF_LIFE_HOURS: f64 = 168.0;

/// Half-life for last-accessed recency decay.
pub const DEFAULT_ACCESS_HALF_LIFE_HOURS: f64 = 48.0;

/// Score multiplier applied to stale observations.
pub const STALENESS_PENALTY: f64 = 0.5;

/// Minimum group size before consolidation merges a group.
pub const DEFAULT_CONSOLIDATION_MIN_GROUP: usize = 3;

/// Separator placed between merged text bodies.
pub const CONSOLIDATION_DELIMITER: &str = "\n\n---\n\n";

/// Default number of observations embedded per backfill call.
pub const DEFAULT_BACKFILL_BATCH: usize = 100;

/// Default number of observations returned by context lookups.
pub const DEFAULT_CONTEXT_LIMIT: usize = 50;
