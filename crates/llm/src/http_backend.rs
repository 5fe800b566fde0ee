//! HTTP Generation Backend
//!
//! POSTs the request payload as JSON to `<base_url><endpoint>` with the
//! `x-api-key` header and hands back the plain-text response body as a
//! chunk stream. The body is not framed; every chunk is raw text bytes.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use super::provider::{parse_http_error, ChunkStream, GenerationBackend};
use super::types::{GenerationRequest, LlmError, LlmResult, API_KEY_HEADER};

/// Generation backend talking to a remote HTTP endpoint.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// Create a backend rooted at `base_url` (e.g. `https://tools.example.com`).
    pub fn new(client: reqwest::Client, base_url: &str) -> LlmResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LlmError::invalid_request(format!("base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LlmError::invalid_request(format!(
                "base URL '{}' cannot carry a path",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    /// Resolve an endpoint path against the base URL, keeping any path
    /// prefix the base URL already has.
    pub fn endpoint_url(&self, endpoint: &str) -> LlmResult<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = endpoint.trim_start_matches('/');
        if path.is_empty() {
            return Err(LlmError::invalid_request("endpoint path is empty"));
        }
        Url::parse(&format!("{}/{}", base, path))
            .map_err(|e| LlmError::invalid_request(format!("endpoint '{}': {}", endpoint, e)))
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open_stream(
        &self,
        request: &GenerationRequest,
        api_key: &str,
    ) -> LlmResult<ChunkStream> {
        let url = self.endpoint_url(&request.endpoint)?;
        tracing::debug!(tool = %request.tool_id, %url, "sending generation request");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(&request.payload)
            .send()
            .await
            .map_err(|e| LlmError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(parse_http_error(status.as_u16(), &body_text));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| LlmError::network(e.to_string())));
        Ok(Box::pin(stream))
    }
}
