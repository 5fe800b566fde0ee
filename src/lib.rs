//! Writedeck
//!
//! Form-driven text generation tools with streamed output and a local,
//! per-tool run history. It includes:
//! - CLI command handlers
//! - Services: history store, history sidebar, tool session, clipboard
//! - Storage layer (JSON config, file-backed key-value store, API key)
//! - Data models and utilities

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::execution::{ExecutionUpdate, NewExecution, ToolExecution};
pub use models::settings::{AppConfig, SettingsUpdate};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
