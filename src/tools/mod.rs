pub mod catalog;
pub mod gate;

pub use catalog::{classify, SafetyTier, ToolDefinition};
pub use gate::{validate_invocation, ToolInvocationRequest};
