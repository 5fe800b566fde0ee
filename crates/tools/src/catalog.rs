//! Tool Catalog
//!
//! Registry of tool definitions, keyed by id and iterated in registration
//! order. `ToolCatalog::builtin()` holds the tools that ship with Writedeck.

use std::collections::HashMap;

use crate::definition::ToolDefinition;
use crate::error::{ToolError, ToolResult};
use crate::schema::{FieldSpec, FieldValue};

/// Registry of tool definitions.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: HashMap<String, ToolDefinition>,
    /// Insertion order for deterministic iteration
    order: Vec<String>,
}

impl ToolCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same id is replaced in place.
    pub fn register(&mut self, tool: ToolDefinition) {
        if !self.tools.contains_key(&tool.id) {
            self.order.push(tool.id.clone());
        }
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Look up a tool by id.
    pub fn get(&self, id: &str) -> ToolResult<&ToolDefinition> {
        self.tools
            .get(id)
            .ok_or_else(|| ToolError::UnknownTool(id.to_string()))
    }

    /// All tools in registration order.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The built-in tools.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for tool in builtin_tools() {
            catalog.register(tool);
        }
        catalog
    }
}

const GRADE_LEVELS: &[&str] = &[
    "kindergarten",
    "elementary",
    "middle school",
    "high school",
    "university",
];

const TONES: &[&str] = &["professional", "friendly", "persuasive", "casual", "formal"];

fn builtin_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new("quiz-generator", "Quiz Generator")
            .description("Generate a multiple-choice quiz on a topic")
            .field(
                FieldSpec::text("topic", "Topic")
                    .required()
                    .placeholder("e.g. photosynthesis"),
            )
            .field(FieldSpec::select("grade_level", "Grade level", GRADE_LEVELS))
            .field(
                FieldSpec::text("question_count", "Number of questions")
                    .default_value(FieldValue::text("10")),
            )
            .field(FieldSpec::toggle("include_answers", "Include answer key"))
            .model_aware(),
        ToolDefinition::new("lesson-planner", "Lesson Planner")
            .description("Draft a lesson plan with objectives and activities")
            .field(FieldSpec::text("subject", "Subject").required())
            .field(FieldSpec::text("topic", "Topic").required())
            .field(FieldSpec::select("grade_level", "Grade level", GRADE_LEVELS))
            .field(
                FieldSpec::text("duration", "Duration")
                    .default_value(FieldValue::text("45 minutes")),
            )
            .model_aware(),
        ToolDefinition::new("email-writer", "Email Writer")
            .description("Write an email from a few key points")
            .field(FieldSpec::text("recipient", "Recipient").placeholder("e.g. my manager"))
            .field(FieldSpec::long_text("key_points", "Key points").required())
            .field(FieldSpec::select("tone", "Tone", TONES)),
        ToolDefinition::new("text-summarizer", "Text Summarizer")
            .description("Summarize a passage of text")
            .field(FieldSpec::long_text("text", "Text").required())
            .field(FieldSpec::select("length", "Length", &["short", "medium", "detailed"]))
            .field(FieldSpec::toggle("bullet_points", "Use bullet points")),
        ToolDefinition::new("rubric-generator", "Rubric Generator")
            .description("Build a grading rubric for an assignment")
            .field(FieldSpec::long_text("assignment", "Assignment description").required())
            .field(FieldSpec::select("grade_level", "Grade level", GRADE_LEVELS))
            .field(
                FieldSpec::text("point_scale", "Point scale")
                    .default_value(FieldValue::text("4")),
            )
            .model_aware(),
        ToolDefinition::new("essay-outline", "Essay Outline")
            .description("Outline an essay around a thesis")
            .field(FieldSpec::text("thesis", "Thesis or topic").required())
            .field(FieldSpec::select(
                "essay_type",
                "Essay type",
                &["argumentative", "expository", "narrative", "compare and contrast"],
            ))
            .field(FieldSpec::toggle("include_sources", "Suggest sources")),
        ToolDefinition::new("social-media-post", "Social Media Post")
            .description("Write a post for a social platform")
            .field(FieldSpec::long_text("message", "What to announce").required())
            .field(FieldSpec::select(
                "platform",
                "Platform",
                &["linkedin", "x", "instagram", "facebook"],
            ))
            .field(FieldSpec::select("tone", "Tone", TONES))
            .field(FieldSpec::toggle("hashtags", "Add hashtags")),
        ToolDefinition::new("product-description", "Product Description")
            .description("Describe a product for a store listing")
            .field(FieldSpec::text("product_name", "Product name").required())
            .field(FieldSpec::long_text("features", "Key features").required())
            .field(FieldSpec::text("audience", "Target audience")),
        ToolDefinition::new("text-rewriter", "Text Rewriter")
            .description("Rewrite text in a different style")
            .field(FieldSpec::long_text("text", "Text").required())
            .field(FieldSpec::select(
                "style",
                "Style",
                &["simpler", "more formal", "more concise", "more engaging"],
            ))
            .model_aware(),
        ToolDefinition::new("meeting-notes", "Meeting Notes")
            .description("Turn a transcript into structured notes and action items")
            .field(FieldSpec::long_text("transcript", "Transcript").required())
            .field(FieldSpec::toggle("action_items", "Extract action items")),
    ]
}
