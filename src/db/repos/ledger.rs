//! Import ledger repo.
//!
//! The ledger is append-only: rows are inserted once per imported legacy
//! session and never updated. `clear` exists as a maintenance escape hatch
//! and is not part of the import flow.

use rusqlite::{params, Row};

use crate::db::models::ImportLedgerEntry;
use crate::db::DbPool;
use crate::error::CoreError;

fn row_to_entry(row: &Row) -> rusqlite::Result<ImportLedgerEntry> {
    Ok(ImportLedgerEntry {
        new_session_id: row.get("new_session_id")?,
        source_legacy_id: row.get("source_legacy_id")?,
        message_count: row.get("message_count")?,
        imported_at: row.get("imported_at")?,
    })
}

pub fn get_all(pool: &DbPool) -> Result<Vec<ImportLedgerEntry>, CoreError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT * FROM import_ledger
         ORDER BY imported_at ASC, new_session_id ASC",
    )?;
    let rows = stmt.query_map([], row_to_entry)?;
    let entries = rows.collect::<Result<Vec<_>, _>>().map_err(CoreError::Database)?;
    Ok(entries)
}

/// Membership check by the original legacy identity. This is the key the
/// importer consults, so re-running migration with freshly minted session
/// ids still detects already-imported sources.
pub fn contains_legacy(pool: &DbPool, source_legacy_id: &str) -> Result<bool, CoreError> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM import_ledger WHERE source_legacy_id = ?1",
        params![source_legacy_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn append(pool: &DbPool, entry: &ImportLedgerEntry) -> Result<(), CoreError> {
    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO import_ledger
         (new_session_id, source_legacy_id, message_count, imported_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.new_session_id,
            entry.source_legacy_id,
            entry.message_count,
            entry.imported_at,
        ],
    )?;
    Ok(())
}

pub fn count(pool: &DbPool) -> Result<i64, CoreError> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM import_ledger", [], |row| row.get(0))?;
    Ok(count)
}

pub fn clear(pool: &DbPool) -> Result<usize, CoreError> {
    let conn = pool.get()?;
    let rows = conn.execute("DELETE FROM import_ledger", [])?;
    tracing::warn!(cleared = rows, "Import ledger cleared");
    Ok(rows)
}

// ============================================================================
// Tests
// ============================================================================
