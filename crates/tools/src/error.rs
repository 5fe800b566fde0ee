//! Tool Errors

use thiserror::Error;

/// Errors raised while validating a form or resolving a tool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// A required field is absent or blank.
    #[error("Field '{0}' is required")]
    MissingField(String),

    /// The form carries a field the tool does not define.
    #[error("Unknown field '{field}' for tool '{tool}'")]
    UnknownField { tool: String, field: String },

    /// The value has the wrong kind or is not an allowed option.
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// No tool is registered under this id.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
}

/// Result type alias for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

impl ToolError {
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
