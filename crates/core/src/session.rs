use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Agent session tracked across prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub id: i64,
    pub content_session_id: String,
    pub project: String,
    pub user_prompt: Option<String>,
    pub memory_session_id: Option<String>,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub started_at_epoch: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_at_epoch: Option<i64>,
}

/// Lifecycle state of a session. `Active` moves to a terminal state once.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(CoreError::InvalidSessionStatus(other.to_owned())),
        }
    }
}

/// User prompt captured verbatim. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPrompt {
    pub id: i64,
    pub session_id: String,
    pub project: String,
    pub prompt_number: u32,
    pub prompt_text: String,
    pub created_at: DateTime<Utc>,
    pub created_at_epoch: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewUserPrompt {
    pub session_id: String,
    pub project: String,
    pub prompt_number: u32,
    pub prompt_text: String,
}

impl NewUserPrompt {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        project: impl Into<String>,
        prompt_number: u32,
        prompt_text: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            project: project.into(),
            prompt_number,
            prompt_text: prompt_text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_known_values() {
        for status in [SessionStatus::Active, SessionStatus::Completed, SessionStatus::Failed] {
            assert_eq!(status.as_str().parse::<SessionStatus>().unwrap(), status);
        }
    }

    #[test]
    fn status_rejects_unknown() {
        let err = "paused".parse::<SessionStatus>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn only_active_is_non_terminal() {
        assert!(!SessionStatus::Active.is_terminal());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
    }
}
