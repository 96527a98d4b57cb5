//! Observation records: one atomic event captured during a coding session.

mod builder;
mod observation_type;

pub use builder::*;
pub use observation_type::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored observation, as read back from the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    /// Monotonically increasing row id
    pub id: i64,
    /// Session this observation belongs to
    pub session_id: String,
    /// Project this observation belongs to
    pub project: String,
    /// Kind of event that produced the observation
    pub observation_type: ObservationType,
    /// Short human-readable title
    pub title: String,
    /// Optional one-line context
    pub subtitle: Option<String>,
    /// Raw free-text body (tool output, command result, note)
    pub text: Option<String>,
    /// Prose explanation of what happened and why
    pub narrative: Option<String>,
    /// Specific facts learned
    pub facts: Vec<String>,
    /// Concept tags for categorization
    pub concepts: Vec<String>,
    /// Files read while producing the observation
    pub files_read: Vec<String>,
    /// Files written while producing the observation
    pub files_modified: Vec<String>,
    /// Prompt ordinal within the session
    pub prompt_number: u32,
    /// Wall-clock creation time
    pub created_at: DateTime<Utc>,
    /// Creation time in epoch milliseconds; used for ordering and decay
    pub created_at_epoch: i64,
    /// Last time a search returned this observation, epoch milliseconds
    pub last_accessed_epoch: Option<i64>,
    /// Set when a referenced file changed on disk after creation
    pub is_stale: bool,
}

impl Observation {
    /// Text fed to the embedding provider: title, narrative, body and concepts.
    #[must_use]
    pub fn embedding_text(&self) -> String {
        embedding_text(
            &self.title,
            self.subtitle.as_deref(),
            self.narrative.as_deref(),
            self.text.as_deref(),
            &self.facts,
            &self.concepts,
        )
    }

    /// Canonical grouping key for the modified-file list: sorted and de-duplicated.
    #[must_use]
    pub fn canonical_files_modified(&self) -> Vec<String> {
        canonical_file_list(&self.files_modified)
    }
}

pub(crate) fn embedding_text(
    title: &str,
    subtitle: Option<&str>,
    narrative: Option<&str>,
    text: Option<&str>,
    facts: &[String],
    concepts: &[String],
) -> String {
    let mut parts: Vec<&str> = vec![title];
    parts.extend(subtitle);
    parts.extend(narrative);
    parts.extend(text);
    parts.extend(facts.iter().map(String::as_str));
    parts.extend(concepts.iter().map(String::as_str));
    parts.retain(|p| !p.trim().is_empty());
    parts.join("\n")
}

/// Sort and de-duplicate a file list so `[b, a]` and `[a, b, a]` compare equal.
#[must_use]
pub fn canonical_file_list(files: &[String]) -> Vec<String> {
    let mut canonical: Vec<String> = files
        .iter()
        .map(|f| f.trim().to_owned())
        .filter(|f| !f.is_empty())
        .collect();
    canonical.sort();
    canonical.dedup();
    canonical
}
