//! Migration v3: project display-name aliases

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS project_aliases (
    project_name TEXT PRIMARY KEY,
    display_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";
