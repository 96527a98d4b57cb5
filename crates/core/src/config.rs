//! Runtime configuration assembled from `AGENTMEM_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ACCESS_HALF_LIFE_HOURS, DEFAULT_CONSOLIDATION_MIN_GROUP, DEFAULT_HYBRID_BOOST,
    DEFAULT_RECENCY_HALF_LIFE_HOURS, DEFAULT_VECTOR_THRESHOLD,
};
use crate::env_config::{env_bool_with_default, env_list, env_parse_with_default};

pub const DB_PATH_ENV: &str = "AGENTMEM_DB_PATH";
pub const DB_POOL_SIZE_ENV: &str = "AGENTMEM_DB_POOL_SIZE";
pub const EMBEDDING_PROVIDERS_ENV: &str = "AGENTMEM_EMBEDDING_PROVIDERS";

/// Tunables for hybrid ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Minimum cosine similarity for vector candidates.
    pub vector_threshold: f32,
    /// Multiplier for candidates found by both sources.
    pub hybrid_boost: f64,
    /// Half-life of creation recency.
    pub recency_half_life_hours: f64,
    /// Half-life of last-accessed recency (context mode).
    pub access_half_life_hours: f64,
    /// Halve the score of observations whose files changed on disk.
    pub staleness_penalty: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            vector_threshold: DEFAULT_VECTOR_THRESHOLD,
            hybrid_boost: DEFAULT_HYBRID_BOOST,
            recency_half_life_hours: DEFAULT_RECENCY_HALF_LIFE_HOURS,
            access_half_life_hours: DEFAULT_ACCESS_HALF_LIFE_HOURS,
            staleness_penalty: true,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    pub db_path: PathBuf,
    pub db_pool_size: u32,
    /// Ordered embedding provider preference (`fastembed`, `hash`). Empty disables embeddings.
    pub embedding_providers: Vec<String>,
    pub consolidation_min_group: usize,
    pub search: SearchConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            db_pool_size: 8,
            embedding_providers: vec!["fastembed".to_owned()],
            consolidation_min_group: DEFAULT_CONSOLIDATION_MIN_GROUP,
            search: SearchConfig::default(),
        }
    }
}

impl MemoryConfig {
    /// Build configuration from the environment, clamping out-of-range values.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let db_path = std::env::var_os(DB_PATH_ENV).map_or(defaults.db_path, PathBuf::from);

        let embedding_providers = match env_list(EMBEDDING_PROVIDERS_ENV) {
            Some(list) if list.iter().any(|p| p == "none") => Vec::new(),
            Some(list) => list,
            None => defaults.embedding_providers,
        };

        let search = SearchConfig {
            vector_threshold: clamp_logged(
                "AGENTMEM_VECTOR_THRESHOLD",
                env_parse_with_default("AGENTMEM_VECTOR_THRESHOLD", DEFAULT_VECTOR_THRESHOLD),
                0.0,
                1.0,
            ),
            hybrid_boost: clamp_logged(
                "AGENTMEM_HYBRID_BOOST",
                env_parse_with_default("AGENTMEM_HYBRID_BOOST", DEFAULT_HYBRID_BOOST),
                1.0,
                2.0,
            ),
            recency_half_life_hours: clamp_logged(
                "AGENTMEM_RECENCY_HALF_LIFE_HOURS",
                env_parse_with_default(
                    "AGENTMEM_RECENCY_HALF_LIFE_HOURS",
                    DEFAULT_RECENCY_HALF_LIFE_HOURS,
                ),
                1.0,
                24.0 * 365.0,
            ),
            access_half_life_hours: clamp_logged(
                "AGENTMEM_ACCESS_HALF_LIFE_HOURS",
                env_parse_with_default(
                    "AGENTMEM_ACCESS_HALF_LIFE_HOURS",
                    DEFAULT_ACCESS_HALF_LIFE_HOURS,
                ),
                1.0,
                24.0 * 365.0,
            ),
            staleness_penalty: env_bool_with_default("AGENTMEM_STALENESS_PENALTY", true),
        };

        Self {
            db_path,
            db_pool_size: env_parse_with_default(DB_POOL_SIZE_ENV, defaults.db_pool_size).max(1),
            embedding_providers,
            consolidation_min_group: env_parse_with_default(
                "AGENTMEM_CONSOLIDATE_MIN_GROUP",
                DEFAULT_CONSOLIDATION_MIN_GROUP,
            )
            .max(2),
            search,
        }
    }
}

/// Default database location under the platform data directory.
#[must_use]
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentmem")
        .join("memory.db")
}

fn clamp_logged<T>(var: &str, value: T, min: T, max: T) -> T
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };
    if clamped != value {
        tracing::warn!(var, original = %value, clamped = %clamped, "config value clamped");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tunables() {
        let config = MemoryConfig::default();
        assert_eq!(config.consolidation_min_group, 3);
        assert_eq!(config.embedding_providers, vec!["fastembed".to_owned()]);
        assert!((config.search.vector_threshold - 0.3).abs() < f32::EPSILON);
        assert!((config.search.hybrid_boost - 1.15).abs() < f64::EPSILON);
        assert!(config.search.staleness_penalty);
        assert!(config.db_path.ends_with("agentmem/memory.db"));
    }

    #[test]
    fn clamp_logged_bounds_values() {
        assert!((clamp_logged("X", 3.0_f64, 1.0, 2.0) - 2.0).abs() < f64::EPSILON);
        assert!((clamp_logged("X", 0.5_f64, 1.0, 2.0) - 1.0).abs() < f64::EPSILON);
        assert!((clamp_logged("X", 1.5_f64, 1.0, 2.0) - 1.5).abs() < f64::EPSILON);
    }
}
