//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type for startup and server-level
//! failures. Per-invocation failures never reach it: they are reported inside
//! the tool result.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from tool lookup.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::catalog::ToolError),

    /// The operation catalog could not be loaded.
    #[error("Catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),

    /// The dispatch engine could not be set up.
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] crate::engine::DispatchError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failures while serving.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
