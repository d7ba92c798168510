//! Descriptors and payload types for remotely served capabilities.
//!
//! All external content shapes are decided once at the MCP boundary; nothing
//! downstream re-checks optional fields at runtime.

use serde::{Deserialize, Serialize};

/// A tool advertised by a session, in the shape the model API consumes.
///
/// Created once at discovery; never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A named parameterized prompt advertised by a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptDescriptor {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgumentDescriptor>,
}

/// One named argument of a prompt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptArgumentDescriptor {
    pub name: String,
    pub description: Option<String>,
}

/// Result payload of a tool invocation.
#[derive(Debug, Clone)]
pub struct ToolCallOutcome {
    pub structured_content: Option<serde_json::Value>,
    pub text_content: Option<String>,
    pub content: Vec<serde_json::Value>,
}

impl ToolCallOutcome {
    /// Collapse to a single value, preferring structured content, then text.
    pub fn into_value_or_text(self) -> serde_json::Value {
        if let Some(structured) = self.structured_content {
            return structured;
        }
        if let Some(text) = self.text_content {
            return serde_json::Value::String(text);
        }
        serde_json::Value::Array(self.content)
    }
}

/// One content item of a fetched resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceContent {
    pub text: Option<String>,
}

/// One message of an expanded prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub content: PromptContent,
}

/// Prompt message content, resolved into an explicit variant at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptContent {
    Text(String),
    Parts(Vec<PromptPart>),
}

impl PromptContent {
    /// Flatten to the text fed into the conversation engine.
    pub fn text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// One typed part of prompt content; only the text payload is consumed here.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPart {
    pub text: Option<String>,
}
