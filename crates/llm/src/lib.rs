//! Writedeck LLM
//!
//! Client side of a text-generation request:
//! - `http_client` - reqwest client factory with proxy support
//! - `provider` - the `GenerationBackend` trait and HTTP error mapping
//! - `http_backend` - the reqwest implementation (POST + streamed body)
//! - `decoder` - incremental UTF-8 decoding of body chunks
//! - `consumer` - cancellable consumption of a chunk stream into accumulated text
//! - `scripted` - an in-process backend that replays canned responses

pub mod consumer;
pub mod decoder;
pub mod http_backend;
pub mod http_client;
pub mod provider;
pub mod scripted;
pub mod types;

// Re-export main types
pub use consumer::{OutputSink, StreamConsumer};
pub use decoder::Utf8ChunkDecoder;
pub use http_backend::HttpBackend;
pub use http_client::build_http_client;
pub use provider::{ChunkStream, GenerationBackend};
pub use scripted::{ScriptedBackend, ScriptedResponse};
pub use types::*;
