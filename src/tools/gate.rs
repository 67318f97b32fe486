//! Pure validation gate for tool invocations.
//!
//! The gate never solicits approval or a reason itself; the renderer collects
//! the missing metadata from the user and re-invokes validation. Nothing
//! reaches the execution layer without passing this gate first.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;

use crate::error::CoreError;
use crate::tools::catalog::{self, SafetyTier};
use crate::validation::require_valid_id;

/// An invocation attempt as submitted by the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ToolInvocationRequest {
    pub tool_id: String,
    #[ts(type = "Record<string, unknown>")]
    pub parameters: Map<String, Value>,
    /// Whether the user has confirmed this invocation.
    #[serde(default)]
    pub approved: bool,
    /// Justification, mandatory for destructive-tier tools.
    pub reason: Option<String>,
}

/// Decide accept/reject for an invocation attempt.
///
/// - `Safe`: always valid.
/// - `Mutating`: requires `approved`.
/// - `Destructive`: requires `approved` and a non-whitespace `reason`;
///   missing approval is reported before a missing reason.
///
/// Known tools additionally get their parameters checked against the
/// catalog schema. Errors are never retried here — the caller re-collects
/// metadata and calls again.
pub fn validate_invocation(request: &ToolInvocationRequest) -> Result<(), CoreError> {
    require_valid_id("tool_id", &request.tool_id)?;

    let tier = catalog::classify(&request.tool_id);
    match tier {
        SafetyTier::Safe => {}
        SafetyTier::Mutating => {
            if !request.approved {
                return Err(CoreError::ApprovalRequired(format!(
                    "tool '{}' mutates state and needs user approval",
                    request.tool_id
                )));
            }
        }
        SafetyTier::Destructive => {
            if !request.approved {
                return Err(CoreError::ApprovalRequired(format!(
                    "tool '{}' is destructive and needs user approval",
                    request.tool_id
                )));
            }
            let has_reason = request
                .reason
                .as_deref()
                .is_some_and(|r| !r.trim().is_empty());
            if !has_reason {
                return Err(CoreError::ReasonRequired(format!(
                    "tool '{}' is destructive and needs a justification",
                    request.tool_id
                )));
            }
        }
    }

    validate_parameters(request)?;

    tracing::debug!(tool_id = %request.tool_id, tier = ?tier, "Invocation passed the safety gate");
    Ok(())
}

/// Schema-check the parameter payload for known tools. Unknown tools carry
/// no schema; they already classify as destructive, so the approval + reason
/// requirements above still hold.
fn validate_parameters(request: &ToolInvocationRequest) -> Result<(), CoreError> {
    let Some(def) = catalog::lookup(&request.tool_id) else {
        return Ok(());
    };

    let validator = jsonschema::validator_for(&def.parameters_schema)
        .map_err(|e| CoreError::Internal(format!("tool '{}' schema: {e}", request.tool_id)))?;

    let instance = Value::Object(request.parameters.clone());
    if let Err(error) = validator.validate(&instance) {
        return Err(CoreError::SchemaViolation(format!(
            "tool '{}' parameters at '{}': {}",
            request.tool_id, error.instance_path, error
        )));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
