//! SQL schema for the factwall SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Connection tuning plus the full DDL; idempotent thanks to
/// `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA cache_size = -64000;
PRAGMA temp_store = MEMORY;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS facts (
    id                 TEXT PRIMARY KEY,
    content            TEXT NOT NULL,
    author_name        TEXT NOT NULL,
    created_by_session TEXT NOT NULL,
    created_at         INTEGER NOT NULL,   -- ms since the Unix epoch
    upvotes            INTEGER NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
    downvotes          INTEGER NOT NULL DEFAULT 0 CHECK (downvotes >= 0)
);

-- One row per (session, fact); counters on facts mirror these rows.
CREATE TABLE IF NOT EXISTS votes (
    session_id TEXT NOT NULL,
    fact_id    TEXT NOT NULL REFERENCES facts(id) ON DELETE CASCADE,
    vote_type  TEXT NOT NULL CHECK (vote_type IN ('up', 'down')),
    created_at INTEGER NOT NULL,
    PRIMARY KEY (session_id, fact_id)
);

CREATE INDEX IF NOT EXISTS idx_facts_created_at ON facts(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_facts_session    ON facts(created_by_session);
CREATE INDEX IF NOT EXISTS idx_votes_session    ON votes(session_id);
CREATE INDEX IF NOT EXISTS idx_votes_fact       ON votes(fact_id);

PRAGMA user_version = 1;
";
