//! Legacy storage scanner.
//!
//! The pre-1.0 Context Kit stored conversations as JSON exports, one file
//! per session (or an array export holding several). Records are read-only
//! snapshots: the scanner never mutates or rewrites legacy files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// One conversation as found in legacy storage. Field types are deliberately
/// loose (`Value` timestamps): the export format mixed RFC3339 strings and
/// epoch numbers, and strictness belongs to the migrator, not the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacySessionRecord {
    #[serde(default)]
    pub legacy_id: String,
    #[serde(default)]
    pub messages: Vec<LegacyMessage>,
    #[serde(default)]
    pub created_at: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyMessage {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Read-only collaborator producing the raw scan input.
pub trait LegacyStore: Send + Sync {
    fn scan(&self) -> Result<Vec<LegacySessionRecord>, CoreError>;
}

/// Scans `*.json` exports under a directory.
pub struct JsonDirLegacyStore {
    dir: PathBuf,
}

impl JsonDirLegacyStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LegacyStore for JsonDirLegacyStore {
    /// An absent or empty directory is not an error: there is simply nothing
    /// to migrate. Unreadable or unparsable files are skipped with a warning
    /// and the scan continues.
    fn scan(&self) -> Result<Vec<LegacySessionRecord>, CoreError> {
        if !self.dir.is_dir() {
            tracing::debug!(dir = %self.dir.display(), "Legacy store absent, nothing to scan");
            return Ok(Vec::new());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        // Stable scan order regardless of filesystem enumeration order.
        paths.sort();

        let mut records = Vec::new();
        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable legacy file");
                    continue;
                }
            };
            match parse_export(&content) {
                Ok(mut parsed) => records.append(&mut parsed),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unparsable legacy file");
                }
            }
        }

        tracing::info!(count = records.len(), dir = %self.dir.display(), "Legacy scan complete");
        Ok(records)
    }
}

/// A file holds either a single record or an array export.
fn parse_export(content: &str) -> Result<Vec<LegacySessionRecord>, serde_json::Error> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_file(dir: &std::path::Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_absent_directory_is_empty_not_error() {
        let store = JsonDirLegacyStore::new("/nonexistent/legacy/sessions");
        assert_eq!(store.scan().unwrap().len(), 0);
    }

    #[test]
    fn test_empty_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonDirLegacyStore::new(tmp.path());
        assert_eq!(store.scan().unwrap().len(), 0);
    }

    #[test]
    fn test_scan_single_and_array_exports() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "a.json",
            r#"{"legacy_id":"a","messages":[{"role":"user","content":"hi"}],"created_at":"2023-05-01T12:00:00Z"}"#,
        );
        write_file(
            tmp.path(),
            "bulk.json",
            r#"[{"legacy_id":"b","messages":[]},{"legacy_id":"c","messages":[]}]"#,
        );

        let store = JsonDirLegacyStore::new(tmp.path());
        let records = store.scan().unwrap();
        assert_eq!(records.len(), 3);
        // Sorted by file name: a.json before bulk.json
        assert_eq!(records[0].legacy_id, "a");
        assert_eq!(records[0].messages.len(), 1);
        assert_eq!(records[1].legacy_id, "b");
        assert_eq!(records[2].legacy_id, "c");
    }

    #[test]
    fn test_bad_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "broken.json", "{ not json");
        write_file(tmp.path(), "notes.txt", "ignored entirely");
        write_file(tmp.path(), "ok.json", r#"{"legacy_id":"ok","messages":[]}"#);

        let store = JsonDirLegacyStore::new(tmp.path());
        let records = store.scan().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].legacy_id, "ok");
    }

    #[test]
    fn test_numeric_timestamps_survive_scan() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(
            tmp.path(),
            "epoch.json",
            r#"{"legacy_id":"e","messages":[{"role":"user","content":"x","timestamp":1714560000}],"created_at":1714560000000}"#,
        );

        let store = JsonDirLegacyStore::new(tmp.path());
        let records = store.scan().unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].created_at.as_ref().unwrap().is_number());
    }
}
