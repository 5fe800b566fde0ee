//! Stream Event Types
//!
//! Events describing the life of one generation request. `writedeck run
//! --json` emits them as newline-delimited JSON.

use serde::{Deserialize, Serialize};

/// One observable step of a streaming generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A request was accepted by the endpoint and the body is streaming.
    Started {
        tool_id: String,
        generation: u64,
    },

    /// Newly decoded text appended to the output.
    TextDelta { content: String },

    /// The stream ended normally; `output` is the full accumulated text.
    Complete {
        output: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        execution_id: Option<String>,
    },

    /// The request was cancelled before the stream ended.
    Cancelled,

    /// The request failed; `message` is the user-facing text.
    Error { message: String },
}

impl StreamEvent {
    /// Whether this event ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamEvent::Complete { .. } | StreamEvent::Cancelled | StreamEvent::Error { .. }
        )
    }
}
