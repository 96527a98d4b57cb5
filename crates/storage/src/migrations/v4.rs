//! Migration v4: observation embeddings
//!
//! One little-endian f32 blob per observation, removed with its row.

pub(super) const SQL: &str = "
CREATE TABLE IF NOT EXISTS observation_embeddings (
    observation_id INTEGER PRIMARY KEY
        REFERENCES observations(id) ON DELETE CASCADE,
    embedding BLOB NOT NULL,
    model TEXT NOT NULL,
    dimensions INTEGER NOT NULL,
    created_at TEXT NOT NULL
);
";
