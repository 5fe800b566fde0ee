//! Generation Backend Trait
//!
//! A backend turns a `GenerationRequest` into a lazy, finite,
//! non-restartable stream of body chunks. Dropping the stream tears the
//! request down.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use super::types::{GenerationRequest, LlmError, LlmResult};

/// Stream of raw body chunks produced by a backend.
pub type ChunkStream = Pin<Box<dyn Stream<Item = LlmResult<Bytes>> + Send>>;

/// Trait that every generation backend implements.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Returns the backend name for identification in logs.
    fn name(&self) -> &'static str;

    /// Send the request and return the response body as a chunk stream.
    ///
    /// Fails with an HTTP error when the endpoint answers with a status
    /// outside the success range. `api_key` is never empty here; callers
    /// refuse to invoke a backend without one.
    async fn open_stream(
        &self,
        request: &GenerationRequest,
        api_key: &str,
    ) -> LlmResult<ChunkStream>;
}

/// Normalise the caller-supplied key, treating blank keys as missing.
pub fn require_api_key(api_key: Option<&str>) -> LlmResult<&str> {
    match api_key.map(str::trim) {
        Some(key) if !key.is_empty() => Ok(key),
        _ => Err(LlmError::MissingApiKey),
    }
}

/// Map a non-success HTTP status code to an error.
pub fn parse_http_error(status: u16, body: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            status,
            message: "Invalid API key".to_string(),
        },
        403 => LlmError::AuthenticationFailed {
            status,
            message: "Access denied".to_string(),
        },
        _ => LlmError::Http {
            status,
            body: body.trim().to_string(),
        },
    }
}
