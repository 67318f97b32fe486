use rusqlite::Connection;

use crate::error::CoreError;

/// Run the consolidated schema migration.
/// The pre-1.0 incremental migrations are merged into a single idempotent schema.
pub fn run(conn: &Connection) -> Result<(), CoreError> {
    tracing::debug!("Running database migrations");

    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database migrations complete");
    Ok(())
}

const SCHEMA: &str = r#"

-- ============================================================================
-- Chat Sessions
-- ============================================================================

CREATE TABLE IF NOT EXISTS chat_sessions (
    id                TEXT PRIMARY KEY,
    title             TEXT NOT NULL,
    source_legacy_id  TEXT,
    message_count     INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chat_sessions_created ON chat_sessions(created_at);
CREATE INDEX IF NOT EXISTS idx_chat_sessions_legacy  ON chat_sessions(source_legacy_id);

-- ============================================================================
-- Chat Messages
-- ============================================================================

CREATE TABLE IF NOT EXISTS chat_messages (
    id          TEXT PRIMARY KEY,
    session_id  TEXT NOT NULL REFERENCES chat_sessions(id) ON DELETE CASCADE,
    role        TEXT NOT NULL CHECK(role IN ('user', 'assistant', 'system')),
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chat_messages_session ON chat_messages(session_id);

-- ============================================================================
-- Import Ledger
--
-- Single source of truth for "has this legacy session already been imported".
-- Keyed by the original legacy identity so that re-running migration (which
-- mints fresh session ids) cannot produce a second entry for the same source.
-- Append-only: rows are never updated, only inserted or cleared wholesale.
-- ============================================================================

CREATE TABLE IF NOT EXISTS import_ledger (
    new_session_id    TEXT PRIMARY KEY,
    source_legacy_id  TEXT NOT NULL UNIQUE,
    message_count     INTEGER NOT NULL,
    imported_at       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_import_ledger_imported ON import_ledger(imported_at);

"#;
