//! Scripted Backend
//!
//! An in-process `GenerationBackend` that replays queued responses in order.
//! Used by tests across the workspace to simulate chunked bodies, HTTP
//! failures and slow streams without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use tokio::sync::mpsc;

use super::provider::{parse_http_error, ChunkStream, GenerationBackend};
use super::types::{GenerationRequest, LlmError, LlmResult};

/// One canned response.
pub enum ScriptedResponse {
    /// A successful body delivered as these chunks.
    Chunks(Vec<Bytes>),
    /// A non-success status with a body.
    Status { status: u16, body: String },
    /// A body that yields `chunks` and then fails with a network error.
    FailAfter { chunks: Vec<Bytes>, message: String },
    /// A body fed by the test through a channel; ends when the sender drops.
    Channel(mpsc::UnboundedReceiver<LlmResult<Bytes>>),
}

impl ScriptedResponse {
    /// Successful body made of text chunks.
    pub fn chunks<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Chunks(
            parts
                .into_iter()
                .map(|p| Bytes::from(Into::<String>::into(p)))
                .collect(),
        )
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

/// Backend that answers from a queue of `ScriptedResponse`s.
#[derive(Default)]
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<ScriptedResponse>>,
    requests: Mutex<Vec<(GenerationRequest, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next request.
    pub fn push(&self, response: ScriptedResponse) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(response);
        }
    }

    /// Queue a channel-fed response and return its sender.
    pub fn push_channel(&self) -> mpsc::UnboundedSender<LlmResult<Bytes>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.push(ScriptedResponse::Channel(rx));
        tx
    }

    /// Number of requests that reached the backend.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Requests received so far, with the API key each carried.
    pub fn requests(&self) -> Vec<(GenerationRequest, String)> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn open_stream(
        &self,
        request: &GenerationRequest,
        api_key: &str,
    ) -> LlmResult<ChunkStream> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push((request.clone(), api_key.to_string()));
        }

        let next = self
            .responses
            .lock()
            .map_err(|_| LlmError::network("scripted backend lock poisoned"))?
            .pop_front()
            .ok_or_else(|| LlmError::network("no scripted response queued"))?;

        match next {
            ScriptedResponse::Chunks(chunks) => {
                Ok(Box::pin(stream::iter(
                    chunks.into_iter().map(Ok::<Bytes, LlmError>),
                )))
            }
            ScriptedResponse::Status { status, body } => Err(parse_http_error(status, &body)),
            ScriptedResponse::FailAfter { chunks, message } => {
                let items = chunks
                    .into_iter()
                    .map(Ok::<Bytes, LlmError>)
                    .chain(std::iter::once(Err(LlmError::network(message))));
                Ok(Box::pin(stream::iter(items)))
            }
            ScriptedResponse::Channel(mut rx) => {
                Ok(Box::pin(stream::poll_fn(move |cx| rx.poll_recv(cx))))
            }
        }
    }
}
