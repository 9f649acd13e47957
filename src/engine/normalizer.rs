//! Response normalizer.
//!
//! Maps `(status, body)` onto the uniform success/failure envelope. Decoding
//! is two explicit steps: try to read structured JSON, otherwise keep the raw
//! text. Both outcomes are ordinary results on a 2xx response.

use rmcp::model::{CallToolResult, Content};
use serde_json::Value;

use super::error::DispatchError;

/// Uniform result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResult {
    /// Pretty-printed JSON or the raw body text.
    Success(String),
    /// Human-readable failure message.
    Failure(String),
}

impl NormalizedResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Text carried by either variant.
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Failure(text) => text,
        }
    }

    /// Convert to the protocol's tool result, flagging failures as errors.
    pub fn into_call_tool_result(self) -> CallToolResult {
        match self {
            Self::Success(text) => CallToolResult::success(vec![Content::text(text)]),
            Self::Failure(text) => CallToolResult::error(vec![Content::text(text)]),
        }
    }
}

impl From<DispatchError> for NormalizedResult {
    fn from(err: DispatchError) -> Self {
        Self::Failure(err.to_string())
    }
}

/// Outcome of the decode attempt on a successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    /// A JSON object or array.
    Structured(Value),
    /// Anything else: empty, plain text, malformed JSON, bare scalars.
    Opaque(String),
}

/// First step: attempt to read the body as a JSON object or array.
pub fn decode_body(body: &[u8]) -> DecodedBody {
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => DecodedBody::Structured(value),
        _ => DecodedBody::Opaque(String::from_utf8_lossy(body).into_owned()),
    }
}

/// Normalize a raw response into the invocation result.
pub fn normalize(status: u16, body: &[u8]) -> NormalizedResult {
    if status >= 400 {
        return DispatchError::RemoteApplication {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        }
        .into();
    }

    match decode_body(body) {
        DecodedBody::Structured(value) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => NormalizedResult::Success(pretty),
            Err(_) => NormalizedResult::Success(String::from_utf8_lossy(body).into_owned()),
        },
        DecodedBody::Opaque(text) => NormalizedResult::Success(text),
    }
}
