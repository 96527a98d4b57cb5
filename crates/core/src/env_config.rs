//! Environment variable parsing with warn-level logging for invalid values.

/// Parse an environment variable with a default fallback.
///
/// - If the variable is not set: returns `default` silently (expected case).
/// - If the variable is set but cannot be parsed: logs a warning and returns `default`.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    match std::env::var(var) {
        Ok(v) => match v.trim().parse() {
            Ok(n) => n,
            Err(_) => {
                tracing::warn!(
                    var,
                    value = %v,
                    default = %default,
                    "invalid env var value, using default"
                );
                default
            },
        },
        Err(_) => default,
    }
}

/// Parse a boolean flag. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
pub fn env_bool_with_default(var: &str, default: bool) -> bool {
    match std::env::var(var) {
        Ok(v) => match v.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(var, value = %v, default, "invalid boolean env var, using default");
                default
            },
        },
        Err(_) => default,
    }
}

/// Parse a comma-separated list, trimming entries and dropping empty ones.
///
/// Returns `None` when the variable is unset so callers can apply their own default.
pub fn env_list(var: &str) -> Option<Vec<String>> {
    let raw = std::env::var(var).ok()?;
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(var: &str, value: &str) {
        // SAFETY: each test uses a unique variable name.
        unsafe { std::env::set_var(var, value) };
    }

    fn unset(var: &str) {
        // SAFETY: each test uses a unique variable name.
        unsafe { std::env::remove_var(var) };
    }

    #[test]
    fn test_env_parse_valid_value() {
        let var_name = "TEST_AGENTMEM_ENV_PARSE_VALID";
        set(var_name, "42");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 42);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_invalid_value() {
        let var_name = "TEST_AGENTMEM_ENV_PARSE_INVALID";
        set(var_name, "banana");
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
        unset(var_name);
    }

    #[test]
    fn test_env_parse_missing_var() {
        let var_name = "TEST_AGENTMEM_ENV_PARSE_MISSING";
        unset(var_name);
        let result: u32 = env_parse_with_default(var_name, 10);
        assert_eq!(result, 10);
    }

    #[test]
    fn test_env_bool_variants() {
        let var_name = "TEST_AGENTMEM_ENV_BOOL";
        set(var_name, "off");
        assert!(!env_bool_with_default(var_name, true));
        set(var_name, "YES");
        assert!(env_bool_with_default(var_name, false));
        set(var_name, "maybe");
        assert!(env_bool_with_default(var_name, true));
        unset(var_name);
    }

    #[test]
    fn test_env_list_splits_and_trims() {
        let var_name = "TEST_AGENTMEM_ENV_LIST";
        set(var_name, " FastEmbed , ,hash ");
        assert_eq!(env_list(var_name), Some(vec!["fastembed".to_owned(), "hash".to_owned()]));
        unset(var_name);
        assert_eq!(env_list(var_name), None);
    }
}
