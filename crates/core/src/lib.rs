//! Writedeck Core
//!
//! Foundational types for the Writedeck workspace. This crate has no
//! dependencies on application-level code (HTTP clients, CLI, file storage).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `kv` - Injectable key-value store trait and the in-memory implementation
//! - `proxy` - Proxy configuration data types shared across workspace crates
//! - `streaming` - Stream event types emitted while a generation is running
//!
//! ## Design Principles
//!
//! 1. **Minimal dependencies** - serde, thiserror and url only
//! 2. **Trait-based storage** - the history store never touches a concrete backend
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod kv;
pub mod proxy;
pub mod streaming;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Key-Value Storage ──────────────────────────────────────────────────
pub use kv::{KeyValueStore, MemoryStore};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};

// ── Streaming Types ────────────────────────────────────────────────────
pub use streaming::StreamEvent;
