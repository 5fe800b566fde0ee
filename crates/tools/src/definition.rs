//! Tool Definitions
//!
//! A `ToolDefinition` is pure configuration: an id, an endpoint path and a
//! list of fields. Everything a tool page used to hand-write (required-field
//! checks, request bodies, history titles) is derived from it here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};
use crate::schema::{FieldKind, FieldSpec, FieldValue, FormInputs};

/// Maximum length, in characters, of a title derived from inputs.
pub const MAX_TITLE_CHARS: usize = 60;

/// Declarative description of one form-driven generation tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolDefinition {
    /// Stable identifier; also scopes the tool's history collection
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Endpoint path the form is posted to
    pub endpoint: String,
    pub fields: Vec<FieldSpec>,
    /// Whether the request body carries a `model` field
    #[serde(default)]
    pub model_aware: bool,
}

impl ToolDefinition {
    /// Start a definition posting to `/api/<id>`.
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: String::new(),
            endpoint: format!("/api/{}", id),
            fields: Vec::new(),
            model_aware: false,
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.description = text.to_string();
        self
    }

    pub fn endpoint(mut self, path: &str) -> Self {
        self.endpoint = path.to_string();
        self
    }

    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    pub fn model_aware(mut self) -> Self {
        self.model_aware = true;
        self
    }

    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// A blank form with every field at its initial value.
    pub fn blank_inputs(&self) -> FormInputs {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.initial_value()))
            .collect()
    }

    /// Required fields that are absent or blank, in form order.
    pub fn missing_required<'a>(&'a self, inputs: &FormInputs) -> Vec<&'a str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| inputs.get(&f.name).map(FieldValue::is_empty).unwrap_or(true))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Whether the form may be submitted.
    pub fn can_submit(&self, inputs: &FormInputs) -> bool {
        self.missing_required(inputs).is_empty()
    }

    /// Check every submitted value against the schema.
    pub fn validate(&self, inputs: &FormInputs) -> ToolResult<()> {
        for (name, value) in inputs {
            let spec = self
                .field_spec(name)
                .ok_or_else(|| ToolError::UnknownField {
                    tool: self.id.clone(),
                    field: name.clone(),
                })?;
            Self::check_kind(spec, value)?;
        }

        if let Some(missing) = self.missing_required(inputs).first() {
            return Err(ToolError::MissingField(missing.to_string()));
        }
        Ok(())
    }

    fn check_kind(spec: &FieldSpec, value: &FieldValue) -> ToolResult<()> {
        match (&spec.kind, value) {
            (FieldKind::Toggle, FieldValue::Flag(_)) => Ok(()),
            (FieldKind::Toggle, FieldValue::Text(_)) => Err(ToolError::invalid_value(
                &spec.name,
                "expected true or false",
            )),
            (_, FieldValue::Flag(_)) => {
                Err(ToolError::invalid_value(&spec.name, "expected text"))
            }
            (FieldKind::Select { options }, FieldValue::Text(s)) => {
                if s.is_empty() || options.iter().any(|o| o == s) {
                    Ok(())
                } else {
                    Err(ToolError::invalid_value(
                        &spec.name,
                        format!("'{}' is not one of: {}", s, options.join(", ")),
                    ))
                }
            }
            (FieldKind::Text | FieldKind::LongText, FieldValue::Text(_)) => Ok(()),
        }
    }

    /// JSON request body: every defined field (blank-form values fill the
    /// gaps) plus `model` for model-aware tools.
    pub fn payload(&self, inputs: &FormInputs, model: Option<&str>) -> Value {
        let mut body = Map::new();
        for field in &self.fields {
            let value = inputs
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| field.initial_value());
            let json = match value {
                FieldValue::Text(s) => Value::String(s),
                FieldValue::Flag(b) => Value::Bool(b),
            };
            body.insert(field.name.clone(), json);
        }
        if self.model_aware {
            if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
                body.insert("model".to_string(), Value::String(model.to_string()));
            }
        }
        Value::Object(body)
    }

    /// Title for a history record: the first non-blank text field, whitespace
    /// collapsed and truncated, or `"<name> run"`.
    pub fn derive_title(&self, inputs: &FormInputs) -> String {
        self.fields
            .iter()
            .filter(|f| f.kind.is_textual())
            .filter_map(|f| inputs.get(&f.name).and_then(FieldValue::as_text))
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .find(|s| !s.is_empty())
            .map(|s| truncate_chars(&s, MAX_TITLE_CHARS))
            .unwrap_or_else(|| format!("{} run", self.name))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}
