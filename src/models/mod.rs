//! Data Models
//!
//! Contains the data structures shared by storage, services and commands.

pub mod execution;
pub mod settings;

pub use execution::*;
pub use settings::*;
