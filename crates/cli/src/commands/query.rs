use agentmem_core::{ObservationType, SearchFilters, validation::clamp_limit};
use chrono::DateTime;

/// Accepts RFC 3339 or a raw epoch-millisecond integer.
pub(crate) fn parse_epoch(value: &str) -> Result<i64, String> {
    if let Ok(ms) = value.parse::<i64>() {
        return Ok(ms);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp_millis())
        .map_err(|e| format!("expected RFC 3339 time or epoch milliseconds: {e}"))
}

pub(crate) fn filters(
    project: Option<String>,
    observation_type: Option<ObservationType>,
    start_epoch: Option<i64>,
    end_epoch: Option<i64>,
    limit: Option<usize>,
) -> SearchFilters {
    SearchFilters { project, observation_type, start_epoch, end_epoch, limit: clamp_limit(limit) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_epoch_ms_and_rfc3339() {
        assert_eq!(parse_epoch("1717243200000"), Ok(1_717_243_200_000));
        assert_eq!(parse_epoch("2024-06-01T12:00:00Z"), Ok(1_717_243_200_000));
        assert!(parse_epoch("yesterday").is_err());
    }

    #[test]
    fn filters_clamp_limit() {
        let f = filters(Some("acme".to_owned()), None, None, None, Some(0));
        assert_eq!(f.limit, 1);
        assert_eq!(f.project.as_deref(), Some("acme"));
    }
}
