//! Query filters, search hits and job reports shared across crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{DEFAULT_QUERY_LIMIT, Observation, ObservationType, Summary};

/// Filters applied by lexical search and listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub project: Option<String>,
    pub observation_type: Option<ObservationType>,
    /// Inclusive lower bound on creation epoch (ms)
    pub start_epoch: Option<i64>,
    /// Inclusive upper bound on creation epoch (ms)
    pub end_epoch: Option<i64>,
    pub limit: usize,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            project: None,
            observation_type: None,
            start_epoch: None,
            end_epoch: None,
            limit: DEFAULT_QUERY_LIMIT,
        }
    }
}

impl SearchFilters {
    #[must_use]
    pub fn for_project(project: impl Into<String>) -> Self {
        Self { project: Some(project.into()), ..Self::default() }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Full-text match. `rank` is the raw bm25 value (lower is better) and is
/// `None` for hits produced by the substring fallback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LexicalHit {
    pub observation: Observation,
    pub rank: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryHit {
    pub summary: Summary,
    pub rank: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LexicalResults {
    pub observations: Vec<LexicalHit>,
    pub summaries: Vec<SummaryHit>,
}

/// Vector candidate: observation id plus cosine similarity to the query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct VectorMatch {
    pub observation_id: i64,
    pub similarity: f32,
}

/// Which retrieval path produced a ranked hit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MatchSource {
    Hybrid,
    Vector,
    Keyword,
    /// Context mode, no query text
    Recent,
}

impl MatchSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::Vector => "vector",
            Self::Keyword => "keyword",
            Self::Recent => "recent",
        }
    }
}

/// Per-signal contributions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct SignalBreakdown {
    pub semantic: f64,
    pub lexical: f64,
    pub recency: f64,
    pub access_recency: f64,
    pub project_match: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HybridHit {
    pub observation: Observation,
    pub score: f64,
    pub source: MatchSource,
    pub signals: SignalBreakdown,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsolidationReport {
    /// Groups at or above the minimum size
    pub groups: usize,
    /// Groups merged into one survivor
    pub merged: usize,
    /// Rows deleted
    pub removed: usize,
    /// Groups rolled back after an error
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StalenessReport {
    pub checked: usize,
    pub marked_stale: usize,
    pub missing_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingStats {
    pub total: u64,
    pub embedded: u64,
    pub percentage: f64,
    pub provider: Option<String>,
    pub dimensions: Option<usize>,
    pub available: bool,
}

/// Share of embedded rows as a percentage rounded to two decimals.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "row counts fit in f64 mantissa")]
pub fn embedded_percentage(embedded: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = embedded as f64 * 100.0 / total as f64;
    (pct * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectStats {
    pub project: String,
    pub observations: u64,
    pub summaries: u64,
    pub prompts: u64,
    pub sessions: u64,
    pub embedded: u64,
    pub stale: u64,
    pub by_type: BTreeMap<String, u64>,
    pub first_epoch: Option<i64>,
    pub last_epoch: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageStats {
    pub observations: u64,
    pub summaries: u64,
    pub prompts: u64,
    pub sessions: u64,
    pub projects: u64,
    pub embeddings: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: usize,
    pub limit: usize,
}

impl<T> PaginatedResult<T> {
    #[must_use]
    pub fn has_more(&self) -> bool {
        (self.offset + self.items.len()) < usize::try_from(self.total).unwrap_or(usize::MAX)
    }
}

/// Chronological window around an anchor observation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timeline {
    pub anchor: Observation,
    /// Older neighbours, oldest first
    pub before: Vec<Observation>,
    /// Newer neighbours, oldest first
    pub after: Vec<Observation>,
}

/// What a new session gets injected with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextBundle {
    pub project: String,
    pub display_name: String,
    pub observations: Vec<Observation>,
    pub summaries: Vec<Summary>,
}
