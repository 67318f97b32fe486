//! Backend core of the Context Kit desktop app: the tool-invocation safety
//! gate and the legacy session migration pipeline. The renderer talks to
//! this crate over the host bridge; everything here is UI-free.

pub mod db;
pub mod error;
pub mod logging;
pub mod migration;
pub mod tools;
pub mod validation;

pub use db::models::ImportLedgerEntry;
pub use error::CoreError;
pub use migration::{
    batch_migrate_sessions, dedupe_legacy_sessions, run_migration, ImportOutcome,
    JsonDirLegacyStore, LegacySessionRecord, LegacyStore, MigratedSession, MigrationReport,
    SessionImporter, SessionSink, SqliteSessionSink,
};
pub use tools::{classify, validate_invocation, SafetyTier, ToolInvocationRequest};
