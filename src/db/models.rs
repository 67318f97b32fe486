use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ============================================================================
// Chat Sessions
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    /// Set when the session was imported from the pre-1.0 storage format.
    pub source_legacy_id: Option<String>,
    pub message_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChatMessage {
    pub id: String,
    pub session_id: String,
    pub role: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSessionInput {
    /// Caller-supplied session id; minted when absent. Imports pass the
    /// migrated session's id so the ledger resolves against the live store.
    pub id: Option<String>,
    pub title: String,
    pub source_legacy_id: Option<String>,
    /// Overrides the insertion timestamp; imports carry the legacy creation time.
    pub created_at: Option<String>,
    pub messages: Vec<CreateMessageInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateMessageInput {
    pub role: String,
    pub content: String,
    pub created_at: Option<String>,
}

// ============================================================================
// Import Ledger
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportLedgerEntry {
    pub new_session_id: String,
    pub source_legacy_id: String,
    pub message_count: i64,
    pub imported_at: String,
}
