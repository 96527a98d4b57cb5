//! Boundary validation. Stores trust their input, so everything reaching
//! them passes through here first.

use std::sync::LazyLock;

use regex::Regex;

use crate::{
    CoreError, DEFAULT_QUERY_LIMIT, MAX_BATCH_IDS, MAX_OBSERVATION_TEXT_BYTES,
    MAX_PROJECT_NAME_CHARS, MAX_QUERY_LIMIT, MAX_SUMMARY_FIELD_BYTES, MAX_TITLE_CHARS,
    NewObservation, NewSummary, NewUserPrompt, Result,
};

#[expect(clippy::unwrap_used, reason = "static regex pattern is compile-time validated")]
static PROJECT_NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w][\w .@:/+-]*$").unwrap());

fn invalid(msg: impl Into<String>) -> CoreError {
    CoreError::InvalidInput(msg.into())
}

/// Project keys: word characters plus `. @ : / + -` and spaces, not
/// starting with punctuation.
///
/// # Errors
/// Returns `CoreError::InvalidInput` when the name is empty, too long or
/// contains other characters.
pub fn validate_project(project: &str) -> Result<()> {
    if project.trim().is_empty() {
        return Err(invalid("project must not be empty"));
    }
    if project.chars().count() > MAX_PROJECT_NAME_CHARS {
        return Err(invalid(format!("project exceeds {MAX_PROJECT_NAME_CHARS} characters")));
    }
    if !PROJECT_NAME_REGEX.is_match(project) {
        return Err(invalid(format!("project contains unsupported characters: {project:?}")));
    }
    Ok(())
}

/// # Errors
/// Returns `CoreError::InvalidInput` for an empty or oversized session id.
pub fn validate_session_id(session_id: &str) -> Result<()> {
    if session_id.trim().is_empty() {
        return Err(invalid("session_id must not be empty"));
    }
    if session_id.chars().count() > MAX_PROJECT_NAME_CHARS {
        return Err(invalid(format!("session_id exceeds {MAX_PROJECT_NAME_CHARS} characters")));
    }
    Ok(())
}

/// # Errors
/// Returns `CoreError::InvalidInput` for an empty or oversized title.
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(invalid("title must not be empty"));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(invalid(format!("title exceeds {MAX_TITLE_CHARS} characters")));
    }
    Ok(())
}

fn check_bytes(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(v) if v.len() > max => Err(invalid(format!("{field} exceeds {max} bytes"))),
        _ => Ok(()),
    }
}

/// # Errors
/// Returns the first validation failure found in the observation.
pub fn validate_new_observation(obs: &NewObservation) -> Result<()> {
    validate_session_id(&obs.session_id)?;
    validate_project(&obs.project)?;
    validate_title(&obs.title)?;
    check_bytes("subtitle", obs.subtitle.as_deref(), MAX_OBSERVATION_TEXT_BYTES)?;
    check_bytes("text", obs.text.as_deref(), MAX_OBSERVATION_TEXT_BYTES)?;
    check_bytes("narrative", obs.narrative.as_deref(), MAX_OBSERVATION_TEXT_BYTES)?;
    let list_bytes: usize = [&obs.facts, &obs.concepts, &obs.files_read, &obs.files_modified]
        .iter()
        .flat_map(|list| list.iter())
        .map(String::len)
        .sum();
    if list_bytes > MAX_OBSERVATION_TEXT_BYTES {
        return Err(invalid(format!("list fields exceed {MAX_OBSERVATION_TEXT_BYTES} bytes")));
    }
    Ok(())
}

/// # Errors
/// Returns `CoreError::InvalidInput` when ids are missing or any text field
/// is oversized.
pub fn validate_new_summary(summary: &NewSummary) -> Result<()> {
    validate_session_id(&summary.session_id)?;
    validate_project(&summary.project)?;
    for (field, value) in summary.text_fields() {
        check_bytes(field, value, MAX_SUMMARY_FIELD_BYTES)?;
    }
    Ok(())
}

/// # Errors
/// Returns `CoreError::InvalidInput` for an empty or oversized prompt.
pub fn validate_new_prompt(prompt: &NewUserPrompt) -> Result<()> {
    validate_session_id(&prompt.session_id)?;
    validate_project(&prompt.project)?;
    if prompt.prompt_text.trim().is_empty() {
        return Err(invalid("prompt_text must not be empty"));
    }
    check_bytes("prompt_text", Some(&prompt.prompt_text), MAX_OBSERVATION_TEXT_BYTES)
}

/// # Errors
/// Returns `CoreError::InvalidInput` when more than the batch cap is requested.
pub fn validate_ids(ids: &[i64]) -> Result<()> {
    if ids.len() > MAX_BATCH_IDS {
        return Err(invalid(format!("at most {MAX_BATCH_IDS} ids per request, got {}", ids.len())));
    }
    Ok(())
}

/// Clamps a caller-supplied limit into `1..=MAX_QUERY_LIMIT`.
#[must_use]
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_QUERY_LIMIT).clamp(1, MAX_QUERY_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ObservationType;

    #[test]
    fn project_names() {
        for ok in ["acme", "my-app", "org/repo", "a.b_c", "Proj 2", "user@host:app"] {
            assert!(validate_project(ok).is_ok(), "{ok} should pass");
        }
        for bad in ["", "   ", "-leading", "semi;colon", "quote\"d", "tab\tname"] {
            assert!(validate_project(bad).is_err(), "{bad:?} should fail");
        }
        assert!(validate_project(&"a".repeat(MAX_PROJECT_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn title_length_is_counted_in_chars() {
        assert!(validate_title(&"é".repeat(MAX_TITLE_CHARS)).is_ok());
        assert!(validate_title(&"é".repeat(MAX_TITLE_CHARS + 1)).is_err());
        assert!(validate_title("  ").is_err());
    }

    #[test]
    fn oversized_text_is_rejected() {
        let obs = NewObservation::builder("s", "acme", ObservationType::Manual, "t")
            .text("x".repeat(MAX_OBSERVATION_TEXT_BYTES + 1))
            .build();
        let err = validate_new_observation(&obs).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn summary_fields_are_capped() {
        let mut summary = NewSummary::new("s", "acme");
        summary.learned = Some("y".repeat(MAX_SUMMARY_FIELD_BYTES + 1));
        assert!(validate_new_summary(&summary).is_err());
        summary.learned = Some("fine".to_owned());
        assert!(validate_new_summary(&summary).is_ok());
    }

    #[test]
    fn id_batches_are_capped() {
        assert!(validate_ids(&vec![1; MAX_BATCH_IDS]).is_ok());
        assert!(validate_ids(&vec![1; MAX_BATCH_IDS + 1]).is_err());
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None), DEFAULT_QUERY_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(5000)), MAX_QUERY_LIMIT);
    }
}
