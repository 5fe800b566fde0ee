//! Form Schema
//!
//! Field descriptions for a tool's form and the values a user submits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Submitted form: field name to value.
pub type FormInputs = BTreeMap<String, FieldValue>;

/// A submitted field value. Serialised untagged so stored inputs look like
/// `{"topic": "photosynthesis", "include_answers": true}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Blank text counts as empty; a flag is always a value.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Flag(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            FieldValue::Flag(b) => Some(*b),
            FieldValue::Text(_) => None,
        }
    }

    /// Parse a raw command-line value for a field of `kind`.
    pub fn parse_for(kind: &FieldKind, raw: &str) -> Option<Self> {
        match kind {
            FieldKind::Toggle => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(FieldValue::Flag(true)),
                "false" | "no" | "off" | "0" => Some(FieldValue::Flag(false)),
                _ => None,
            },
            _ => Some(FieldValue::Text(raw.to_string())),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Flag(b) => write!(f, "{}", b),
        }
    }
}

/// What sort of input a field takes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text
    Text,
    /// Multi-line text
    LongText,
    /// One of a fixed set of options
    Select { options: Vec<String> },
    /// Boolean switch
    Toggle,
}

impl FieldKind {
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldKind::Text | FieldKind::LongText)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::LongText => "long text",
            FieldKind::Select { .. } => "select",
            FieldKind::Toggle => "toggle",
        }
    }
}

/// One field of a tool's form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    /// Name used as the JSON key in requests and stored inputs
    pub name: String,
    /// Human-readable label
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldValue>,
}

impl FieldSpec {
    fn with_kind(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            required: false,
            placeholder: None,
            default: None,
        }
    }

    pub fn text(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Text)
    }

    pub fn long_text(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::LongText)
    }

    pub fn select(name: &str, label: &str, options: &[&str]) -> Self {
        Self::with_kind(
            name,
            label,
            FieldKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    pub fn toggle(name: &str, label: &str) -> Self {
        Self::with_kind(name, label, FieldKind::Toggle)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, text: &str) -> Self {
        self.placeholder = Some(text.to_string());
        self
    }

    pub fn default_value(mut self, value: FieldValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Value a blank form starts with.
    pub fn initial_value(&self) -> FieldValue {
        if let Some(default) = &self.default {
            return default.clone();
        }
        match &self.kind {
            FieldKind::Toggle => FieldValue::Flag(false),
            FieldKind::Select { options } => {
                FieldValue::Text(options.first().cloned().unwrap_or_default())
            }
            FieldKind::Text | FieldKind::LongText => FieldValue::Text(String::new()),
        }
    }
}
