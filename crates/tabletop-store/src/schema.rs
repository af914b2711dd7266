//! Document store database schema.

/// SQL to create the records table.
pub const CREATE_RECORDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS records (
    seq        INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    id         TEXT NOT NULL,
    parent_id  TEXT,
    version    INTEGER NOT NULL,
    body       TEXT NOT NULL,
    UNIQUE (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_records_parent
    ON records (collection, parent_id, seq);
";
