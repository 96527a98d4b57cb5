//! Input record for creating observations, and its builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ObservationType, embedding_text};

/// Fields supplied when creating an observation. The store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewObservation {
    pub session_id: String,
    pub project: String,
    pub observation_type: ObservationType,
    pub title: String,
    pub subtitle: Option<String>,
    pub text: Option<String>,
    pub narrative: Option<String>,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub concepts: Vec<String>,
    #[serde(default)]
    pub files_read: Vec<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    #[serde(default)]
    pub prompt_number: u32,
    /// Creation time; defaults to now
    pub created_at: DateTime<Utc>,
}

impl NewObservation {
    /// Embedding input, identical to what the stored row will produce.
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

    /// Returns a new builder with the required fields set.
    #[must_use]
    pub fn builder(
        session_id: impl Into<String>,
        project: impl Into<String>,
        observation_type: ObservationType,
        title: impl Into<String>,
    ) -> NewObservationBuilder {
        NewObservationBuilder::new(
            session_id.into(),
            project.into(),
            observation_type,
            title.into(),
        )
    }

    /// Creation time in epoch milliseconds.
    #[must_use]
    pub fn created_at_epoch(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}

/// Builder for constructing [`NewObservation`] instances.
#[derive(Debug, Clone)]
pub struct NewObservationBuilder {
    inner: NewObservation,
}

impl NewObservationBuilder {
    #[must_use]
    fn new(
        session_id: String,
        project: String,
        observation_type: ObservationType,
        title: String,
    ) -> Self {
        Self {
            inner: NewObservation {
                session_id,
                project,
                observation_type,
                title,
                subtitle: None,
                text: None,
                narrative: None,
                facts: Vec::new(),
                concepts: Vec::new(),
                files_read: Vec::new(),
                files_modified: Vec::new(),
                prompt_number: 0,
                created_at: Utc::now(),
            },
        }
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.inner.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn maybe_subtitle(mut self, subtitle: Option<String>) -> Self {
        self.inner.subtitle = subtitle;
        self
    }

    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.inner.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn maybe_text(mut self, text: Option<String>) -> Self {
        self.inner.text = text;
        self
    }

    #[must_use]
    pub fn narrative(mut self, narrative: impl Into<String>) -> Self {
        self.inner.narrative = Some(narrative.into());
        self
    }

    #[must_use]
    pub fn maybe_narrative(mut self, narrative: Option<String>) -> Self {
        self.inner.narrative = narrative;
        self
    }

    #[must_use]
    pub fn facts(mut self, facts: Vec<String>) -> Self {
        self.inner.facts = facts;
        self
    }

    #[must_use]
    pub fn concepts(mut self, concepts: Vec<String>) -> Self {
        self.inner.concepts = concepts;
        self
    }

    #[must_use]
    pub fn files_read(mut self, files_read: Vec<String>) -> Self {
        self.inner.files_read = files_read;
        self
    }

    #[must_use]
    pub fn files_modified(mut self, files_modified: Vec<String>) -> Self {
        self.inner.files_modified = files_modified;
        self
    }

    #[must_use]
    pub fn prompt_number(mut self, prompt_number: u32) -> Self {
        self.inner.prompt_number = prompt_number;
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.inner.created_at = created_at;
        self
    }

    #[must_use]
    pub fn build(self) -> NewObservation {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_optional_fields() {
        let obs = NewObservation::builder("s-1", "acme", ObservationType::Command, "Ran tests")
            .text("cargo test")
            .files_modified(vec!["build.sh".to_owned()])
            .prompt_number(3)
            .build();
        assert_eq!(obs.project, "acme");
        assert_eq!(obs.text.as_deref(), Some("cargo test"));
        assert_eq!(obs.files_modified, vec!["build.sh"]);
        assert_eq!(obs.prompt_number, 3);
        assert!(obs.narrative.is_none());
    }

    #[test]
    fn created_at_epoch_is_millis() {
        let at = DateTime::parse_from_rfc3339("2024-01-01T00:00:01Z").unwrap().with_timezone(&Utc);
        let obs = NewObservation::builder("s", "p", ObservationType::Manual, "t").created_at(at).build();
        assert_eq!(obs.created_at_epoch(), 1_704_067_201_000);
    }
}
