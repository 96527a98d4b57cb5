//! Migration v2: FTS5 for observations and summaries
//!
//! External-content tables kept in sync by triggers. The update triggers
//! only fire for indexed columns so access-time and staleness writes do
//! not churn the index.

pub(super) const SQL: &str = "
CREATE VIRTUAL TABLE IF NOT EXISTS observations_fts USING fts5(
    title, text, narrative, concepts,
    content='observations',
    content_rowid='id'
);

DROP TRIGGER IF EXISTS observations_ai;
CREATE TRIGGER observations_ai AFTER INSERT ON observations BEGIN
    INSERT INTO observations_fts(rowid, title, text, narrative, concepts)
    VALUES (new.id, new.title, new.text, new.narrative, new.concepts);
END;

DROP TRIGGER IF EXISTS observations_ad;
CREATE TRIGGER observations_ad AFTER DELETE ON observations BEGIN
    INSERT INTO observations_fts(observations_fts, rowid, title, text, narrative, concepts)
    VALUES ('delete', old.id, old.title, old.text, old.narrative, old.concepts);
END;

DROP TRIGGER IF EXISTS observations_au;
CREATE TRIGGER observations_au AFTER UPDATE OF title, text, narrative, concepts ON observations BEGIN
    INSERT INTO observations_fts(observations_fts, rowid, title, text, narrative, concepts)
    VALUES ('delete', old.id, old.title, old.text, old.narrative, old.concepts);
    INSERT INTO observations_fts(rowid, title, text, narrative, concepts)
    VALUES (new.id, new.title, new.text, new.narrative, new.concepts);
END;

CREATE VIRTUAL TABLE IF NOT EXISTS summaries_fts USING fts5(
    request, investigated, learned, completed, next_steps, notes,
    content='session_summaries',
    content_rowid='id'
);

DROP TRIGGER IF EXISTS summaries_ai;
CREATE TRIGGER summaries_ai AFTER INSERT ON session_summaries BEGIN
    INSERT INTO summaries_fts(rowid, request, investigated, learned, completed, next_steps, notes)
    VALUES (new.id, new.request, new.investigated, new.learned, new.completed, new.next_steps, new.notes);
END;

DROP TRIGGER IF EXISTS summaries_ad;
CREATE TRIGGER summaries_ad AFTER DELETE ON session_summaries BEGIN
    INSERT INTO summaries_fts(summaries_fts, rowid, request, investigated, learned, completed, next_steps, notes)
    VALUES ('delete', old.id, old.request, old.investigated, old.learned, old.completed, old.next_steps, old.notes);
END;

INSERT INTO observations_fts(observations_fts) VALUES ('rebuild');
INSERT INTO summaries_fts(summaries_fts) VALUES ('rebuild');
";
