//! Idempotent importer: applies migrated sessions to the live store exactly
//! once each, consulting the import ledger before every attempt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::db::models::{CreateSessionInput, ImportLedgerEntry};
use crate::db::{repos, DbPool};
use crate::error::CoreError;
use crate::migration::migrate::MigratedSession;

/// Aggregate result of one import batch. Partial success is the expected
/// steady state; the renderer shows all four numbers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportOutcome {
    pub imported: u32,
    pub skipped: u32,
    pub failed: u32,
    pub errors: Vec<String>,
}

/// Commits a migrated session into the live store. The importer only ever
/// touches the live store through this seam, keeping the migration logic
/// decoupled from the concrete store.
#[async_trait]
pub trait SessionSink: Send + Sync {
    async fn apply(&self, session: &MigratedSession) -> Result<(), CoreError>;

    /// Best-effort cleanup after a failed `apply`. Failures here are logged
    /// by the importer, never propagated.
    async fn rollback(&self, _session: &MigratedSession) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Live-store sink backed by the chat-session repo.
pub struct SqliteSessionSink {
    pool: DbPool,
}

impl SqliteSessionSink {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionSink for SqliteSessionSink {
    async fn apply(&self, session: &MigratedSession) -> Result<(), CoreError> {
        // The migrated id becomes the live row id, so ledger entries resolve
        // against the store one-to-one.
        repos::sessions::create(
            &self.pool,
            CreateSessionInput {
                id: Some(session.new_session_id.clone()),
                title: session.title.clone(),
                source_legacy_id: Some(session.source_legacy_id.clone()),
                created_at: Some(session.created_at.clone()),
                messages: session.messages.clone(),
            },
        )?;
        Ok(())
    }

    async fn rollback(&self, session: &MigratedSession) -> Result<(), CoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "DELETE FROM chat_sessions WHERE id = ?1",
            rusqlite::params![session.new_session_id],
        )?;
        Ok(())
    }
}

/// Owns the import flow and the ledger. Explicit object with injected
/// storage; construct once and share, there is no ambient singleton.
pub struct SessionImporter {
    pool: DbPool,
    /// Serializes whole batches: two concurrent "re-run migration" triggers
    /// from the renderer must not interleave the ledger check-then-write.
    batch_guard: tokio::sync::Mutex<()>,
}

impl SessionImporter {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            batch_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Current ledger contents, oldest first.
    pub fn list_imported_sessions(&self) -> Result<Vec<ImportLedgerEntry>, CoreError> {
        repos::ledger::get_all(&self.pool)
    }

    /// Import each migrated session at most once, in input order.
    ///
    /// Sessions whose `source_legacy_id` is already ledgered are skipped
    /// without touching the sink, so re-running migration (which mints fresh
    /// session ids) cannot double-import. A failed `apply` is counted and
    /// recorded, the sink's `rollback` is attempted, and no ledger entry is
    /// written; the batch always runs to completion.
    pub async fn import_legacy_sessions(
        &self,
        migrated: &[MigratedSession],
        sink: &dyn SessionSink,
    ) -> Result<ImportOutcome, CoreError> {
        let _guard = self.batch_guard.lock().await;
        let mut outcome = ImportOutcome::default();

        for session in migrated {
            if repos::ledger::contains_legacy(&self.pool, &session.source_legacy_id)? {
                tracing::debug!(
                    legacy_id = %session.source_legacy_id,
                    "Already imported, skipping"
                );
                outcome.skipped += 1;
                continue;
            }

            match sink.apply(session).await {
                Ok(()) => {
                    let entry = ImportLedgerEntry {
                        new_session_id: session.new_session_id.clone(),
                        source_legacy_id: session.source_legacy_id.clone(),
                        message_count: session.message_count,
                        imported_at: chrono::Utc::now().to_rfc3339(),
                    };
                    match repos::ledger::append(&self.pool, &entry) {
                        Ok(()) => outcome.imported += 1,
                        Err(e) => {
                            // Applied but not ledgered: undo so the next run
                            // stays consistent with the ledger.
                            tracing::error!(
                                legacy_id = %session.source_legacy_id,
                                error = %e,
                                "Ledger append failed after apply"
                            );
                            self.try_rollback(sink, session).await;
                            outcome.failed += 1;
                            outcome
                                .errors
                                .push(format!("{}: ledger append: {e}", session.source_legacy_id));
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        legacy_id = %session.source_legacy_id,
                        error = %e,
                        "Import apply failed"
                    );
                    self.try_rollback(sink, session).await;
                    outcome.failed += 1;
                    outcome
                        .errors
                        .push(format!("{}: {e}", session.source_legacy_id));
                }
            }
        }

        tracing::info!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "Import batch complete"
        );
        Ok(outcome)
    }

    async fn try_rollback(&self, sink: &dyn SessionSink, session: &MigratedSession) {
        if let Err(e) = sink.rollback(session).await {
            tracing::warn!(
                legacy_id = %session.source_legacy_id,
                error = %e,
                "Rollback failed, leaving partial state"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
