//! Execution Models
//!
//! Records of completed tool runs, as kept in a tool's history collection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use writedeck_tools::FormInputs;

/// One completed run of a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolExecution {
    /// UUID v4, assigned on append
    pub id: String,
    pub title: String,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: i64,
    pub inputs: FormInputs,
    pub output: String,
    /// Named output sections for tools that produce more than one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outputs: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl ToolExecution {
    /// Apply a partial update. Only fields present in `update` change.
    pub fn apply_update(&mut self, update: ExecutionUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(output) = update.output {
            self.output = output;
        }
        if let Some(outputs) = update.outputs {
            self.outputs = Some(outputs);
        }
        if let Some(model) = update.model {
            self.model = Some(model);
        }
    }
}

/// Fields supplied by the caller when appending; the store assigns
/// `id` and `timestamp`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewExecution {
    pub title: String,
    pub inputs: FormInputs,
    pub output: String,
    #[serde(default)]
    pub outputs: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub model: Option<String>,
}

impl NewExecution {
    pub fn new(title: impl Into<String>, inputs: FormInputs, output: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            inputs,
            output: output.into(),
            outputs: None,
            model: None,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        self.model = model;
        self
    }

    pub fn with_outputs(mut self, outputs: BTreeMap<String, String>) -> Self {
        self.outputs = Some(outputs);
        self
    }

    pub(crate) fn into_execution(self, id: String, timestamp: i64) -> ToolExecution {
        ToolExecution {
            id,
            title: self.title,
            timestamp,
            inputs: self.inputs,
            output: self.output,
            outputs: self.outputs,
            model: self.model,
        }
    }
}

/// Partial update for an existing record (absent fields stay unchanged)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionUpdate {
    pub title: Option<String>,
    pub output: Option<String>,
    pub outputs: Option<BTreeMap<String, String>>,
    pub model: Option<String>,
}

impl ExecutionUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }
}
