//! Config-driven tool catalog for the invocation safety gate.
//!
//! Each capability the renderer can request from the sidecar is described by
//! a `ToolDefinition`: a safety tier plus a JSON schema for its parameters.
//! The table is static — tiers are derived from it at call time and never
//! stored or mutated at runtime.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use ts_rs::TS;

/// Classification of a tool invocation's potential for harm.
///
/// Drives whether human approval and a justification string are mandatory
/// before the invocation may be dispatched to the sidecar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SafetyTier {
    /// Read-only: no approval needed.
    Safe,
    /// Writes or changes app state: requires approval.
    Mutating,
    /// Deletes or irreversibly alters data: requires approval and a reason.
    Destructive,
}

#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub tier: SafetyTier,
    /// JSON schema the invocation parameters must satisfy.
    pub parameters_schema: Value,
}

fn tool(id: &'static str, label: &'static str, tier: SafetyTier, schema: Value) -> ToolDefinition {
    ToolDefinition {
        id,
        label,
        tier,
        parameters_schema: schema,
    }
}

/// The builtin tool catalog. Mirrors the sidecar's capability surface:
/// inspectors are safe, generators are mutating, destructors are destructive.
pub fn builtin_tools() -> &'static [ToolDefinition] {
    static TOOLS: OnceLock<Vec<ToolDefinition>> = OnceLock::new();
    TOOLS.get_or_init(|| {
        vec![
            // ---- Safe: read-only inspection --------------------------------
            tool(
                "context_list",
                "List context entities",
                SafetyTier::Safe,
                json!({
                    "type": "object",
                    "properties": {
                        "kind": { "type": "string" },
                        "limit": { "type": "integer", "minimum": 1 }
                    },
                    "additionalProperties": false
                }),
            ),
            tool(
                "context_read",
                "Read a context entity",
                SafetyTier::Safe,
                json!({
                    "type": "object",
                    "properties": {
                        "entity_id": { "type": "string", "minLength": 1 }
                    },
                    "required": ["entity_id"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "repo_search",
                "Search the repository",
                SafetyTier::Safe,
                json!({
                    "type": "object",
                    "properties": {
                        "query": { "type": "string", "minLength": 1 },
                        "path_glob": { "type": "string" }
                    },
                    "required": ["query"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "sidecar_status",
                "Sidecar health status",
                SafetyTier::Safe,
                json!({ "type": "object", "additionalProperties": false }),
            ),
            // ---- Mutating: generation and writes ---------------------------
            tool(
                "spec_generate",
                "Generate a specification",
                SafetyTier::Mutating,
                json!({
                    "type": "object",
                    "properties": {
                        "entity_id": { "type": "string", "minLength": 1 },
                        "instructions": { "type": "string" }
                    },
                    "required": ["entity_id"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "prompt_convert",
                "Convert a spec into a prompt",
                SafetyTier::Mutating,
                json!({
                    "type": "object",
                    "properties": {
                        "spec_id": { "type": "string", "minLength": 1 },
                        "template": { "type": "string" }
                    },
                    "required": ["spec_id"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "artifact_write",
                "Write a generated artifact",
                SafetyTier::Mutating,
                json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "minLength": 1 },
                        "content": { "type": "string" }
                    },
                    "required": ["path", "content"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "session_rename",
                "Rename a chat session",
                SafetyTier::Mutating,
                json!({
                    "type": "object",
                    "properties": {
                        "session_id": { "type": "string", "minLength": 1 },
                        "title": { "type": "string", "minLength": 1 }
                    },
                    "required": ["session_id", "title"],
                    "additionalProperties": false
                }),
            ),
            // ---- Destructive: irreversible ---------------------------------
            tool(
                "artifact_delete",
                "Delete a generated artifact",
                SafetyTier::Destructive,
                json!({
                    "type": "object",
                    "properties": {
                        "path": { "type": "string", "minLength": 1 }
                    },
                    "required": ["path"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "session_purge",
                "Permanently delete chat sessions",
                SafetyTier::Destructive,
                json!({
                    "type": "object",
                    "properties": {
                        "session_ids": {
                            "type": "array",
                            "items": { "type": "string" },
                            "minItems": 1
                        }
                    },
                    "required": ["session_ids"],
                    "additionalProperties": false
                }),
            ),
            tool(
                "workspace_reset",
                "Reset the workspace state",
                SafetyTier::Destructive,
                json!({
                    "type": "object",
                    "properties": {
                        "confirm_phrase": { "type": "string", "minLength": 1 }
                    },
                    "required": ["confirm_phrase"],
                    "additionalProperties": false
                }),
            ),
        ]
    })
}

pub fn lookup(tool_id: &str) -> Option<&'static ToolDefinition> {
    builtin_tools().iter().find(|t| t.id == tool_id)
}

/// Derive the safety tier for a tool id. Total over all inputs: ids not in
/// the catalog classify as `Destructive` so unknown capabilities fail closed.
pub fn classify(tool_id: &str) -> SafetyTier {
    lookup(tool_id).map(|t| t.tier).unwrap_or(SafetyTier::Destructive)
}

// ============================================================================
// Tests
// ============================================================================
