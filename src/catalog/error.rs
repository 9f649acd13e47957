//! Tool-level error types.

use thiserror::Error;

/// Errors that can occur while looking up or calling a tool by name.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// The call request itself was malformed (not the tool arguments).
    #[error("Invalid tool call: {0}")]
    InvalidCall(String),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid call" error.
    pub fn invalid_call(msg: impl Into<String>) -> Self {
        Self::InvalidCall(msg.into())
    }
}
