use serde::Serialize;

/// Crate-wide error type. Every fallible function returns `Result<T, CoreError>`.
/// Serializes cleanly for the renderer IPC bridge so the frontend gets
/// structured error messages and can branch on `kind`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Approval required: {0}")]
    ApprovalRequired(String),

    #[error("Reason required: {0}")]
    ReasonRequired(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Internal(String),
}

/// The renderer distinguishes `approval_required` from `reason_required` to
/// decide which prompt to show, so `kind` is part of the wire contract.
/// Serializes as `{ error: "...", kind: "..." }`.
impl Serialize for CoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("CoreError", 2)?;
        s.serialize_field("error", &self.to_string())?;
        s.serialize_field("kind", self.kind())?;
        s.end()
    }
}

impl CoreError {
    /// Stable machine-readable discriminant for the renderer.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Database(_) => "database",
            CoreError::Pool(_) => "pool",
            CoreError::NotFound(_) => "not_found",
            CoreError::Validation(_) => "validation",
            CoreError::ApprovalRequired(_) => "approval_required",
            CoreError::ReasonRequired(_) => "reason_required",
            CoreError::SchemaViolation(_) => "schema_violation",
            CoreError::Io(_) => "io",
            CoreError::Serde(_) => "serde",
            CoreError::Internal(_) => "internal",
        }
    }
}
