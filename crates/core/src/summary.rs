use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// End-of-session summary. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub id: i64,
    pub session_id: String,
    pub project: String,
    pub request: Option<String>,
    pub investigated: Option<String>,
    pub learned: Option<String>,
    pub completed: Option<String>,
    pub next_steps: Option<String>,
    pub notes: Option<String>,
    pub prompt_number: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub created_at_epoch: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewSummary {
    pub session_id: String,
    pub project: String,
    #[serde(default)]
    pub request: Option<String>,
    #[serde(default)]
    pub investigated: Option<String>,
    #[serde(default)]
    pub learned: Option<String>,
    #[serde(default)]
    pub completed: Option<String>,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub prompt_number: Option<u32>,
}

impl NewSummary {
    #[must_use]
    pub fn new(session_id: impl Into<String>, project: impl Into<String>) -> Self {
        Self { session_id: session_id.into(), project: project.into(), ..Self::default() }
    }

    /// Named text fields, in storage order.
    #[must_use]
    pub fn text_fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("request", self.request.as_deref()),
            ("investigated", self.investigated.as_deref()),
            ("learned", self.learned.as_deref()),
            ("completed", self.completed.as_deref()),
            ("next_steps", self.next_steps.as_deref()),
            ("notes", self.notes.as_deref()),
        ]
    }
}
