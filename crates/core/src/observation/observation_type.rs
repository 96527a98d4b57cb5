//! Observation classification enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of event an observation records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ObservationType {
    /// A file was written or edited
    FileWrite,
    /// A file was read
    FileRead,
    /// A shell command ran
    Command,
    /// Web or codebase research
    Research,
    /// Work handed off to a sub-agent
    Delegation,
    /// Any other tool invocation
    ToolUse,
    /// Saved explicitly by the user
    Manual,
    /// Learning how existing code or an external API works
    Discovery,
    /// Architectural or design decision
    Decision,
    /// A bug was found and fixed
    Bugfix,
    /// New capability implemented
    Feature,
    /// Structure changed without behaviour change
    Refactor,
    /// General change
    Change,
}

impl ObservationType {
    pub const ALL_VARIANTS: &'static [ObservationType] = &[
        ObservationType::FileWrite,
        ObservationType::FileRead,
        ObservationType::Command,
        ObservationType::Research,
        ObservationType::Delegation,
        ObservationType::ToolUse,
        ObservationType::Manual,
        ObservationType::Discovery,
        ObservationType::Decision,
        ObservationType::Bugfix,
        ObservationType::Feature,
        ObservationType::Refactor,
        ObservationType::Change,
    ];

    /// Returns the string representation stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::FileWrite => "file-write",
            Self::FileRead => "file-read",
            Self::Command => "command",
            Self::Research => "research",
            Self::Delegation => "delegation",
            Self::ToolUse => "tool-use",
            Self::Manual => "manual",
            Self::Discovery => "discovery",
            Self::Decision => "decision",
            Self::Bugfix => "bugfix",
            Self::Feature => "feature",
            Self::Refactor => "refactor",
            Self::Change => "change",
        }
    }
}

impl fmt::Display for ObservationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObservationType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Self::ALL_VARIANTS
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownObservationType(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_snake_and_kebab_case() {
        assert_eq!("file-write".parse::<ObservationType>().unwrap(), ObservationType::FileWrite);
        assert_eq!("TOOL_USE".parse::<ObservationType>().unwrap(), ObservationType::ToolUse);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "telepathy".parse::<ObservationType>().unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn as_str_roundtrips_for_every_variant() {
        for variant in ObservationType::ALL_VARIANTS {
            assert_eq!(variant.as_str().parse::<ObservationType>().unwrap(), *variant);
        }
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&ObservationType::FileRead).unwrap();
        assert_eq!(json, "\"file-read\"");
    }
}
