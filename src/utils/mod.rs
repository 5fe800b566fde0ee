//! Utilities
//!
//! Error types and filesystem path helpers.

pub mod error;
pub mod paths;

pub use error::{AppError, AppResult};
