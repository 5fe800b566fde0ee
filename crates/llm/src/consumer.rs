//! Stream Consumer
//!
//! Drives one generation request end to end: refuses to start without an
//! API key, opens the backend stream, decodes every chunk and publishes the
//! accumulated text after each one. Every await point races against the
//! caller's `CancellationToken`; cancellation drops the stream and is
//! reported as an outcome, not an error.

use std::sync::Arc;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use super::decoder::Utf8ChunkDecoder;
use super::provider::{require_api_key, GenerationBackend};
use super::types::{GenerationRequest, LlmResult, StreamOutcome};

/// Receives output as it accumulates.
pub trait OutputSink: Send {
    /// Called after every chunk that produced text. `accumulated` already
    /// includes `delta`.
    fn publish(&mut self, delta: &str, accumulated: &str);
}

impl<F> OutputSink for F
where
    F: FnMut(&str, &str) + Send,
{
    fn publish(&mut self, delta: &str, accumulated: &str) {
        self(delta, accumulated)
    }
}

/// Consumes backend streams into text.
#[derive(Clone)]
pub struct StreamConsumer {
    backend: Arc<dyn GenerationBackend>,
}

impl StreamConsumer {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Run `request` to completion or cancellation.
    ///
    /// Returns `LlmError::MissingApiKey` without contacting the backend when
    /// `api_key` is absent or blank.
    pub async fn run(
        &self,
        request: &GenerationRequest,
        api_key: Option<&str>,
        cancel: &CancellationToken,
        sink: &mut dyn OutputSink,
    ) -> LlmResult<StreamOutcome> {
        let api_key = require_api_key(api_key)?;

        let mut stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(tool = %request.tool_id, "cancelled before response");
                return Ok(StreamOutcome::Cancelled { partial: String::new() });
            }
            opened = self.backend.open_stream(request, api_key) => opened?,
        };

        let mut decoder = Utf8ChunkDecoder::new();
        let mut accumulated = String::new();
        let mut chunks = 0usize;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                next = stream.next() => Some(next),
            };

            let Some(next) = next else {
                drop(stream);
                tracing::debug!(
                    tool = %request.tool_id,
                    chunks,
                    chars = accumulated.chars().count(),
                    "stream cancelled"
                );
                return Ok(StreamOutcome::Cancelled {
                    partial: accumulated,
                });
            };

            match next {
                None => break,
                Some(Err(e)) => {
                    tracing::debug!(tool = %request.tool_id, chunks, error = %e, "stream read failed");
                    return Err(e);
                }
                Some(Ok(bytes)) => {
                    chunks += 1;
                    if cancel.is_cancelled() {
                        continue;
                    }
                    let text = decoder.decode(&bytes);
                    if !text.is_empty() {
                        accumulated.push_str(&text);
                        sink.publish(&text, &accumulated);
                    }
                }
            }
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            accumulated.push_str(&tail);
            sink.publish(&tail, &accumulated);
        }

        tracing::debug!(tool = %request.tool_id, chunks, "stream complete");
        Ok(StreamOutcome::Completed {
            output: accumulated,
        })
    }
}
