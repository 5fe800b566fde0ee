//! Generation Types
//!
//! Request, outcome and error types shared by every backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed text shown in place of the output when a generation fails.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Something went wrong while generating. Please try again.";

/// Header carrying the user's API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// One outbound generation request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    /// Tool that issued the request (used for logging only)
    pub tool_id: String,
    /// Endpoint path, e.g. `/api/quiz-generator`
    pub endpoint: String,
    /// JSON body: the tool's named fields, plus `model` for model-aware tools
    pub payload: serde_json::Value,
}

impl GenerationRequest {
    pub fn new(
        tool_id: impl Into<String>,
        endpoint: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            tool_id: tool_id.into(),
            endpoint: endpoint.into(),
            payload,
        }
    }
}

/// How a stream that did not fail came to an end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// The body was read to the end.
    Completed { output: String },
    /// The caller cancelled; `partial` is what had accumulated so far.
    Cancelled { partial: String },
}

impl StreamOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamOutcome::Cancelled { .. })
    }
}

/// Errors raised while issuing or reading a generation request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// No API key configured; nothing was sent.
    #[error("API key not configured. Run `writedeck key set <KEY>` to add one.")]
    MissingApiKey,

    /// The endpoint rejected the key (401/403).
    #[error("Authentication failed (HTTP {status}): {message}")]
    AuthenticationFailed { status: u16, message: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection or body read failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The request could not be built (bad endpoint path, bad base URL).
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {message}")]
    ClientBuild { message: String },
}

/// Result type alias for generation operations
pub type LlmResult<T> = Result<T, LlmError>;

impl LlmError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::AuthenticationFailed { status, .. } | LlmError::Http { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
