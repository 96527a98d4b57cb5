//! Relevance signals and composite scoring.
//!
//! Every function here is pure: the orchestrator gathers candidates and
//! timestamps, these turn them into numbers in `[0, 1]`.

use agentmem_core::{HYBRID_BOOST_CAP, STALENESS_PENALTY, SignalBreakdown};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Per-signal weights of a composite score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub semantic: f64,
    pub lexical: f64,
    pub recency: f64,
    pub project_match: f64,
}

/// Weight sets for the two ranking modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPreset {
    /// A query is present.
    Search,
    /// No query: ambient context injection ranked by freshness.
    Context,
}

impl ScoringPreset {
    #[must_use]
    pub const fn weights(self) -> Weights {
        match self {
            Self::Search => {
                Weights { semantic: 0.4, lexical: 0.3, recency: 0.2, project_match: 0.1 }
            },
            Self::Context => {
                Weights { semantic: 0.0, lexical: 0.0, recency: 0.7, project_match: 0.3 }
            },
        }
    }
}

/// Cosine similarity clamped into `[0, 1]`.
#[must_use]
pub fn semantic_score(similarity: f32) -> f64 {
    f64::from(similarity).clamp(0.0, 1.0)
}

/// Min-max normalize raw bm25 ranks so the most negative maps to 1.
///
/// A single rank or a zero range maps every entry to 1.
#[must_use]
pub fn normalize_lexical_ranks(ranks: &[f64]) -> Vec<f64> {
    let (min, max) = ranks.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
        (lo.min(*r), hi.max(*r))
    });
    let range = max - min;
    ranks
        .iter()
        .map(|r| {
            if ranks.len() == 1 || !range.is_finite() || range <= f64::EPSILON {
                1.0
            } else {
                ((max - r) / range).clamp(0.0, 1.0)
            }
        })
        .collect()
}

/// `exp(-age_h * ln2 / half_life_h)`. Future timestamps score 1, missing or
/// non-positive ones score 0.
#[must_use]
#[expect(clippy::cast_precision_loss, reason = "epoch ms differences fit in f64")]
pub fn recency_score(epoch_ms: Option<i64>, now_ms: i64, half_life_hours: f64) -> f64 {
    let Some(epoch) = epoch_ms.filter(|e| *e > 0) else {
        return 0.0;
    };
    if half_life_hours <= 0.0 || !half_life_hours.is_finite() {
        return 0.0;
    }
    if epoch >= now_ms {
        return 1.0;
    }
    let age_hours = (now_ms - epoch) as f64 / MS_PER_HOUR;
    (-age_hours * std::f64::consts::LN_2 / half_life_hours).exp()
}

/// 1 when the candidate's project equals the target, ignoring case.
#[must_use]
pub fn project_match(candidate: &str, target: Option<&str>) -> f64 {
    match target {
        Some(t) if candidate.to_lowercase() == t.to_lowercase() => 1.0,
        _ => 0.0,
    }
}

/// Weighted sum of the signals under `preset`.
///
/// Context mode takes the fresher of creation and access recency.
#[must_use]
pub fn composite(signals: &SignalBreakdown, preset: ScoringPreset) -> f64 {
    let w = preset.weights();
    let recency = match preset {
        ScoringPreset::Search => signals.recency,
        ScoringPreset::Context => signals.recency.max(signals.access_recency),
    };
    w.semantic * signals.semantic
        + w.lexical * signals.lexical
        + w.recency * recency
        + w.project_match * signals.project_match
}

/// Boost for candidates found by both retrieval paths, capped.
#[must_use]
pub fn hybrid_boost(score: f64, factor: f64) -> f64 {
    (score * factor).min(HYBRID_BOOST_CAP)
}

#[must_use]
pub fn staleness_penalty(score: f64, is_stale: bool) -> f64 {
    if is_stale { score * STALENESS_PENALTY } else { score }
}
