//! Writedeck Tools
//!
//! Every tool is a declarative form bound to a generation endpoint. This
//! crate holds the pieces that describe and check those forms:
//! - `schema` - field kinds, field specs and submitted values
//! - `definition` - `ToolDefinition`: validation, request payloads, titles
//! - `catalog` - the registry of built-in tools
//! - `error` - `ToolError`

pub mod catalog;
pub mod definition;
pub mod error;
pub mod schema;

// Re-export core types
pub use catalog::ToolCatalog;
pub use definition::ToolDefinition;
pub use error::{ToolError, ToolResult};
pub use schema::{FieldKind, FieldSpec, FieldValue, FormInputs};
