use rusqlite::{params, Row};

use crate::db::models::{ChatMessage, ChatSession, CreateSessionInput};
use crate::db::DbPool;
use crate::error::CoreError;

// ============================================================================
// Row Mappers
// ============================================================================

fn row_to_session(row: &Row) -> rusqlite::Result<ChatSession> {
    Ok(ChatSession {
        id: row.get("id")?,
        title: row.get("title")?,
        source_legacy_id: row.get("source_legacy_id")?,
        message_count: row.get("message_count")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn row_to_message(row: &Row) -> rusqlite::Result<ChatMessage> {
    Ok(ChatMessage {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        role: row.get("role")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
    })
}

// ============================================================================
// Sessions
// ============================================================================

pub fn create(pool: &DbPool, input: CreateSessionInput) -> Result<ChatSession, CoreError> {
    crate::validation::require_non_empty("title", &input.title)?;

    let id = input
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let now = chrono::Utc::now().to_rfc3339();
    let created_at = input.created_at.unwrap_or_else(|| now.clone());

    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO chat_sessions
         (id, title, source_legacy_id, message_count, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            id,
            input.title,
            input.source_legacy_id,
            input.messages.len() as i64,
            created_at,
            now,
        ],
    )?;

    for msg in &input.messages {
        tx.execute(
            "INSERT INTO chat_messages (id, session_id, role, content, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid::Uuid::new_v4().to_string(),
                id,
                msg.role,
                msg.content,
                msg.created_at.as_deref().unwrap_or(&now),
            ],
        )?;
    }

    tx.commit()?;
    get_by_id(pool, &id)
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<ChatSession, CoreError> {
    let conn = pool.get()?;
    conn.query_row(
        "SELECT * FROM chat_sessions WHERE id = ?1",
        params![id],
        row_to_session,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => CoreError::NotFound(format!("ChatSession {id}")),
        other => CoreError::Database(other),
    })
}

pub fn get_all(
    pool: &DbPool,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Vec<ChatSession>, CoreError> {
    let limit = limit.unwrap_or(50);
    let offset = offset.unwrap_or(0);
    let conn = pool.get()?;

    let mut stmt = conn.prepare(
        "SELECT * FROM chat_sessions
         ORDER BY created_at DESC
         LIMIT ?1 OFFSET ?2",
    )?;
    let rows = stmt.query_map(params![limit, offset], row_to_session)?;
    let sessions = rows.collect::<Result<Vec<_>, _>>().map_err(CoreError::Database)?;
    Ok(sessions)
}

pub fn get_messages(pool: &DbPool, session_id: &str) -> Result<Vec<ChatMessage>, CoreError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT * FROM chat_messages
         WHERE session_id = ?1
         ORDER BY created_at ASC, id ASC",
    )?;
    let rows = stmt.query_map(params![session_id], row_to_message)?;
    let messages = rows.collect::<Result<Vec<_>, _>>().map_err(CoreError::Database)?;
    Ok(messages)
}

pub fn get_total_count(pool: &DbPool) -> Result<i64, CoreError> {
    let conn = pool.get()?;
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM chat_sessions", [], |row| row.get(0))?;
    Ok(count)
}

pub fn delete(pool: &DbPool, id: &str) -> Result<bool, CoreError> {
    let conn = pool.get()?;
    let rows = conn.execute("DELETE FROM chat_sessions WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use crate::db::models::CreateMessageInput;

    fn session_input(title: &str) -> CreateSessionInput {
        CreateSessionInput {
            id: None,
            title: title.into(),
            source_legacy_id: None,
            created_at: None,
            messages: vec![
                CreateMessageInput {
                    role: "user".into(),
                    content: "Generate a spec for the parser module.".into(),
                    created_at: None,
                },
                CreateMessageInput {
                    role: "assistant".into(),
                    content: "Here is a draft specification.".into(),
                    created_at: None,
                },
            ],
        }
    }

    #[test]
    fn test_create_and_get_session() {
        let pool = init_test_db().unwrap();

        let session = create(&pool, session_input("Parser spec")).unwrap();
        assert_eq!(session.title, "Parser spec");
        assert_eq!(session.message_count, 2);
        assert!(session.source_legacy_id.is_none());

        let fetched = get_by_id(&pool, &session.id).unwrap();
        assert_eq!(fetched.id, session.id);

        let messages = get_messages(&pool, &session.id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_get_by_id_not_found() {
        let pool = init_test_db().unwrap();
        let result = get_by_id(&pool, "nonexistent");
        assert!(result.is_err());
    }

    #[test]
    fn test_get_all_with_limit_and_offset() {
        let pool = init_test_db().unwrap();

        for i in 0..5 {
            create(&pool, session_input(&format!("Session {i}"))).unwrap();
        }

        let all = get_all(&pool, None, None).unwrap();
        assert_eq!(all.len(), 5);

        let limited = get_all(&pool, Some(3), None).unwrap();
        assert_eq!(limited.len(), 3);

        let offset = get_all(&pool, Some(10), Some(3)).unwrap();
        assert_eq!(offset.len(), 2);
    }

    #[test]
    fn test_delete_cascades_messages() {
        let pool = init_test_db().unwrap();

        let session = create(&pool, session_input("Doomed")).unwrap();
        assert!(delete(&pool, &session.id).unwrap());
        assert!(get_by_id(&pool, &session.id).is_err());
        assert_eq!(get_messages(&pool, &session.id).unwrap().len(), 0);

        assert!(!delete(&pool, "nonexistent").unwrap());
    }

    #[test]
    fn test_caller_supplied_id_is_kept() {
        let pool = init_test_db().unwrap();

        let mut input = session_input("Pinned id");
        input.id = Some("session-pinned".into());

        let session = create(&pool, input).unwrap();
        assert_eq!(session.id, "session-pinned");
        assert_eq!(get_by_id(&pool, "session-pinned").unwrap().title, "Pinned id");
    }

    #[test]
    fn test_empty_title_rejected() {
        let pool = init_test_db().unwrap();
        let result = create(&pool, session_input("   "));
        assert_eq!(result.unwrap_err().kind(), "validation");
    }

    #[test]
    fn test_import_timestamp_override() {
        let pool = init_test_db().unwrap();

        let mut input = session_input("Imported");
        input.source_legacy_id = Some("legacy-42".into());
        input.created_at = Some("2024-03-01T10:00:00+00:00".into());

        let session = create(&pool, input).unwrap();
        assert_eq!(session.source_legacy_id.as_deref(), Some("legacy-42"));
        assert_eq!(session.created_at, "2024-03-01T10:00:00+00:00");
    }
}
