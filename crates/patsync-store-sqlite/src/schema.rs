//! SQL schema for the patsync SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `user_version` pragma.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per patent, keyed by publication number. Rows are upserted on
-- every ingestion of the same id; created_at survives updates.
CREATE TABLE IF NOT EXISTS patents (
    patent_number TEXT PRIMARY KEY,
    title         TEXT NOT NULL DEFAULT '',
    abstract      TEXT NOT NULL DEFAULT '',
    assignee      TEXT NOT NULL DEFAULT '',
    inventors     TEXT NOT NULL DEFAULT '[]',  -- JSON array of names
    filing_date   TEXT,                        -- ISO 8601 date or NULL
    grant_date    TEXT,
    cpc_codes     TEXT NOT NULL DEFAULT '[]',  -- JSON array of codes
    search_query  TEXT NOT NULL DEFAULT '',
    category      TEXT NOT NULL DEFAULT '',
    created_at    TEXT NOT NULL,               -- ISO 8601 UTC
    updated_at    TEXT NOT NULL
);

-- Sync audit log, strictly append-only. The most recent completed row's
-- range_to is the incremental-sync watermark.
CREATE TABLE IF NOT EXISTS sync_log (
    run_id         TEXT PRIMARY KEY,
    range_from     TEXT NOT NULL,
    range_to       TEXT NOT NULL,
    records_loaded INTEGER NOT NULL,
    query_terms    TEXT NOT NULL DEFAULT '[]', -- JSON array
    sync_status    TEXT NOT NULL,              -- 'completed' | 'failed'
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS patents_assignee_idx    ON patents(assignee);
CREATE INDEX IF NOT EXISTS patents_filing_date_idx ON patents(filing_date);
CREATE INDEX IF NOT EXISTS sync_log_status_idx     ON sync_log(sync_status, range_to);

PRAGMA user_version = 1;
";
