//! Batch conversion of legacy records into the current session schema.
//!
//! Pure with respect to persisted state: nothing here marks a session as
//! imported, so the batch can be re-run freely. Per-record failures are
//! accumulated into the report rather than aborting the batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::db::models::CreateMessageInput;
use crate::migration::scanner::{LegacyMessage, LegacySessionRecord};

/// A legacy record converted to the current schema, ready for import.
/// One-to-one with its source record; `source_legacy_id` is a lookup
/// back-reference, not an ownership edge.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MigratedSession {
    pub new_session_id: String,
    pub source_legacy_id: String,
    pub title: String,
    pub messages: Vec<CreateMessageInput>,
    pub message_count: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MigrationRecordError {
    pub legacy_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MigrationReport {
    pub sessions: Vec<MigratedSession>,
    pub errors: Vec<MigrationRecordError>,
}

/// Convert records one at a time, preserving input order in the output.
/// A malformed record is skipped and reported; the batch never aborts.
pub fn batch_migrate_sessions(records: &[LegacySessionRecord]) -> MigrationReport {
    let mut sessions = Vec::new();
    let mut errors = Vec::new();

    for record in records {
        match migrate_record(record) {
            Ok(session) => sessions.push(session),
            Err(message) => {
                tracing::warn!(legacy_id = %record.legacy_id, %message, "Skipping malformed legacy record");
                errors.push(MigrationRecordError {
                    legacy_id: record.legacy_id.clone(),
                    message,
                });
            }
        }
    }

    tracing::info!(
        migrated = sessions.len(),
        failed = errors.len(),
        "Legacy migration batch complete"
    );
    MigrationReport { sessions, errors }
}

fn migrate_record(record: &LegacySessionRecord) -> Result<MigratedSession, String> {
    if record.legacy_id.trim().is_empty() {
        return Err("missing legacy id".into());
    }

    let created_at = match &record.created_at {
        Some(value) => parse_timestamp(value)
            .ok_or_else(|| format!("unparsable created_at: {value}"))?,
        None => Utc::now(),
    };

    let mut messages = Vec::with_capacity(record.messages.len());
    for (idx, msg) in record.messages.iter().enumerate() {
        messages.push(migrate_message(msg).map_err(|e| format!("message {idx}: {e}"))?);
    }

    Ok(MigratedSession {
        new_session_id: uuid::Uuid::new_v4().to_string(),
        source_legacy_id: record.legacy_id.clone(),
        title: derive_title(record),
        message_count: messages.len() as i64,
        messages,
        created_at: created_at.to_rfc3339(),
    })
}

fn migrate_message(msg: &LegacyMessage) -> Result<CreateMessageInput, String> {
    let role = normalize_role(&msg.role)?;
    let created_at = match &msg.timestamp {
        Some(value) => Some(
            parse_timestamp(value)
                .ok_or_else(|| format!("unparsable timestamp: {value}"))?
                .to_rfc3339(),
        ),
        None => None,
    };
    Ok(CreateMessageInput {
        role: role.into(),
        content: msg.content.clone(),
        created_at,
    })
}

/// The legacy export used a handful of role spellings.
fn normalize_role(role: &str) -> Result<&'static str, String> {
    match role.to_ascii_lowercase().as_str() {
        "user" | "human" => Ok("user"),
        "assistant" | "ai" | "model" => Ok("assistant"),
        "system" => Ok("system"),
        other => Err(format!("unknown role '{other}'")),
    }
}

/// Session title shown in the sidebar: first user message, truncated.
fn derive_title(record: &LegacySessionRecord) -> String {
    const MAX_TITLE: usize = 60;

    let first_user = record
        .messages
        .iter()
        .find(|m| m.role.eq_ignore_ascii_case("user") || m.role.eq_ignore_ascii_case("human"))
        .map(|m| m.content.trim())
        .filter(|c| !c.is_empty());

    match first_user {
        Some(content) => {
            let mut title: String = content.chars().take(MAX_TITLE).collect();
            if content.chars().count() > MAX_TITLE {
                title.push('…');
            }
            title
        }
        None => format!("Imported session {}", record.legacy_id),
    }
}

/// Accepts RFC3339 strings, epoch seconds and epoch millis (the legacy
/// export mixed all three). Values at or above 10^12 are treated as millis.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let n = n.as_i64()?;
            if n >= 1_000_000_000_000 {
                DateTime::from_timestamp_millis(n)
            } else {
                DateTime::from_timestamp(n, 0)
            }
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn msg(role: &str, content: &str) -> LegacyMessage {
        LegacyMessage {
            role: role.into(),
            content: content.into(),
            timestamp: None,
        }
    }

    fn record(id: &str, messages: Vec<LegacyMessage>) -> LegacySessionRecord {
        LegacySessionRecord {
            legacy_id: id.into(),
            messages,
            created_at: Some(json!("2023-05-01T12:00:00+00:00")),
        }
    }

    #[test]
    fn test_order_preserved_and_counts_match() {
        let input: Vec<_> = (0..4)
            .map(|i| record(&format!("legacy-{i}"), vec![msg("user", "hello")]))
            .collect();

        let report = batch_migrate_sessions(&input);
        assert_eq!(report.sessions.len(), 4);
        assert!(report.errors.is_empty());
        for (i, session) in report.sessions.iter().enumerate() {
            assert_eq!(session.source_legacy_id, format!("legacy-{i}"));
            assert_eq!(session.message_count, 1);
        }
    }

    #[test]
    fn test_fresh_ids_minted_each_run() {
        let input = vec![record("a", vec![msg("user", "hi")])];
        let first = batch_migrate_sessions(&input);
        let second = batch_migrate_sessions(&input);
        assert_ne!(
            first.sessions[0].new_session_id,
            second.sessions[0].new_session_id
        );
        assert_eq!(
            first.sessions[0].source_legacy_id,
            second.sessions[0].source_legacy_id
        );
    }

    #[test]
    fn test_malformed_record_does_not_abort_batch() {
        let mut bad = record("bad", vec![msg("user", "x")]);
        bad.created_at = Some(json!("not a timestamp"));

        let input = vec![
            record("ok-1", vec![msg("user", "x")]),
            bad,
            record("ok-2", vec![msg("user", "y")]),
        ];

        let report = batch_migrate_sessions(&input);
        assert_eq!(report.sessions.len(), 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].legacy_id, "bad");
        assert!(report.errors[0].message.contains("created_at"));
        assert_eq!(report.sessions[0].source_legacy_id, "ok-1");
        assert_eq!(report.sessions[1].source_legacy_id, "ok-2");
    }

    #[test]
    fn test_unknown_role_is_record_error() {
        let input = vec![record("r", vec![msg("narrator", "meanwhile")])];
        let report = batch_migrate_sessions(&input);
        assert!(report.sessions.is_empty());
        assert!(report.errors[0].message.contains("unknown role"));
    }

    #[test]
    fn test_role_spellings_normalized() {
        let input = vec![record(
            "r",
            vec![msg("Human", "q"), msg("AI", "a"), msg("system", "s")],
        )];
        let report = batch_migrate_sessions(&input);
        let roles: Vec<_> = report.sessions[0]
            .messages
            .iter()
            .map(|m| m.role.as_str())
            .collect();
        assert_eq!(roles, ["user", "assistant", "system"]);
    }

    #[test]
    fn test_empty_legacy_id_rejected() {
        let input = vec![record("  ", vec![msg("user", "x")])];
        let report = batch_migrate_sessions(&input);
        assert!(report.sessions.is_empty());
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_timestamp_formats() {
        // RFC3339
        assert_eq!(
            parse_timestamp(&json!("2023-05-01T12:00:00+00:00"))
                .unwrap()
                .timestamp(),
            1682942400
        );
        // Epoch seconds
        assert_eq!(
            parse_timestamp(&json!(1682942400)).unwrap().timestamp(),
            1682942400
        );
        // Epoch millis
        assert_eq!(
            parse_timestamp(&json!(1682942400000i64)).unwrap().timestamp(),
            1682942400
        );
        // Garbage
        assert!(parse_timestamp(&json!("yesterday")).is_none());
        assert!(parse_timestamp(&json!(true)).is_none());
    }

    #[test]
    fn test_title_from_first_user_message() {
        let input = vec![record(
            "t",
            vec![msg("system", "boot"), msg("user", "Summarize the repo layout")],
        )];
        let report = batch_migrate_sessions(&input);
        assert_eq!(report.sessions[0].title, "Summarize the repo layout");

        let long = "x".repeat(100);
        let input = vec![record("t2", vec![msg("user", &long)])];
        let report = batch_migrate_sessions(&input);
        assert_eq!(report.sessions[0].title.chars().count(), 61);

        let input = vec![record("t3", vec![msg("assistant", "only me")])];
        let report = batch_migrate_sessions(&input);
        assert_eq!(report.sessions[0].title, "Imported session t3");
    }
}
