//! Storage Layer
//!
//! Handles all data persistence: the JSON config file, the file-backed
//! key-value store and the API key kept inside it.

pub mod config;
pub mod credentials;
pub mod file_store;

pub use config::*;
pub use credentials::*;
pub use file_store::*;
