use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Human-facing display name for a project key. Upserted on rename.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectAlias {
    pub project_name: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
