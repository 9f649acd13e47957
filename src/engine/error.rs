//! Dispatch error types.
//!
//! Every failure an invocation can hit is one of these variants. None of them
//! escape the tool layer as protocol errors: they are rendered into the
//! failure text of the invocation result.

use thiserror::Error;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Problems with the shape or content of an argument bag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The arguments were not a JSON object.
    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// A required parameter was absent or null.
    #[error("missing required parameter '{0}'")]
    MissingRequired(String),

    /// An argument that matches no declared parameter (strict mode only).
    #[error("unknown parameter '{0}'")]
    Unknown(String),

    /// A value could not be coerced to the declared type hint.
    #[error("parameter '{name}' expects {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors that can terminate a single tool invocation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The argument bag was rejected before any request was built.
    #[error("Invalid arguments: {0}")]
    ArgumentShape(#[from] ArgumentError),

    /// The outbound request could not be assembled.
    #[error("Failed to build request: {0}")]
    RequestConstruction(String),

    /// The remote host could not be reached.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The remote host answered with a status >= 400.
    #[error("API error: {body}")]
    RemoteApplication { status: u16, body: String },

    /// No usable response could be read off the wire.
    #[error("Failed to read response: {0}")]
    ResponseDecode(String),

    /// The caller cancelled the invocation while the request was in flight.
    #[error("Request cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Create a request construction error.
    pub fn request_construction(msg: impl Into<String>) -> Self {
        Self::RequestConstruction(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a response decode error.
    pub fn response_decode(msg: impl Into<String>) -> Self {
        Self::ResponseDecode(msg.into())
    }

    /// Whether the failure happened before anything was sent.
    pub fn is_pre_flight(&self) -> bool {
        matches!(self, Self::ArgumentShape(_) | Self::RequestConstruction(_))
    }
}
