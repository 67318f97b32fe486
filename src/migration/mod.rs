//! Legacy session migration pipeline.
//!
//! Flow: scan the pre-1.0 storage (`scanner`) → collapse duplicate exports
//! (`dedupe`) → convert to the current schema (`migrate`) → apply exactly
//! once into the live store, ledger-checked (`importer`).

pub mod dedupe;
pub mod importer;
pub mod migrate;
pub mod scanner;

pub use dedupe::dedupe_legacy_sessions;
pub use importer::{ImportOutcome, SessionImporter, SessionSink, SqliteSessionSink};
pub use migrate::{batch_migrate_sessions, MigratedSession, MigrationRecordError, MigrationReport};
pub use scanner::{JsonDirLegacyStore, LegacyMessage, LegacySessionRecord, LegacyStore};

use crate::error::CoreError;

/// End-to-end convenience for the renderer's migration panel: scan, dedupe,
/// migrate and import in one call. Returns both the migration report and the
/// import outcome so the UI can show per-stage results.
pub async fn run_migration(
    store: &dyn LegacyStore,
    importer: &SessionImporter,
    sink: &dyn SessionSink,
) -> Result<(MigrationReport, ImportOutcome), CoreError> {
    let records = store.scan()?;
    let unique = dedupe_legacy_sessions(records);
    let report = batch_migrate_sessions(&unique);
    let outcome = importer.import_legacy_sessions(&report.sessions, sink).await?;
    Ok((report, outcome))
}

// ============================================================================
// Tests
// ============================================================================
