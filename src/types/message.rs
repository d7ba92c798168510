//! Conversation message types.

use serde::{Deserialize, Serialize};

/// A message in a conversation.
///
/// History is an append-only ordered sequence of messages; a message is never
/// mutated after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message with a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::Text { text: text.into() }],
        }
    }

    /// Create an assistant message from response content blocks,
    /// preserving block order.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Create the user message carrying one round's tool results.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }

    /// Concatenate all text blocks in block order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool-use blocks in their original order.
    pub fn tool_uses(&self) -> Vec<&ContentBlock> {
        self.content
            .iter()
            .filter(|block| matches!(block, ContentBlock::ToolUse { .. }))
            .collect()
    }
}

/// Conversation role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single typed block of message content.
///
/// The serde shape matches the Anthropic Messages API content blocks, so a
/// block list serializes directly into the wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_concatenates_blocks_in_order() {
        let msg = Message::assistant(vec![
            ContentBlock::Text {
                text: "It is ".into(),
            },
            ContentBlock::ToolUse {
                id: "t1".into(),
                name: "get_weather".into(),
                input: json!({"city": "Paris"}),
            },
            ContentBlock::Text {
                text: "18°C".into(),
            },
        ]);
        assert_eq!(msg.text(), "It is 18°C");
    }

    #[test]
    fn tool_uses_preserve_order() {
        let msg = Message::assistant(vec![
            ContentBlock::ToolUse {
                id: "t1".into(),
                name: "first".into(),
                input: json!({}),
            },
            ContentBlock::Text { text: "..".into() },
            ContentBlock::ToolUse {
                id: "t2".into(),
                name: "second".into(),
                input: json!({}),
            },
        ]);
        let uses = msg.tool_uses();
        assert_eq!(uses.len(), 2);
        assert!(matches!(uses[0], ContentBlock::ToolUse { id, .. } if id == "t1"));
        assert!(matches!(uses[1], ContentBlock::ToolUse { id, .. } if id == "t2"));
    }

    #[test]
    fn blocks_serialize_in_wire_shape() {
        let block = ContentBlock::ToolUse {
            id: "t1".into(),
            name: "get_weather".into(),
            input: json!({"city": "Paris"}),
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "tool_use",
                "id": "t1",
                "name": "get_weather",
                "input": {"city": "Paris"},
            })
        );

        let block = ContentBlock::ToolResult {
            tool_use_id: "t1".into(),
            content: "18°C, cloudy".into(),
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({
                "type": "tool_result",
                "tool_use_id": "t1",
                "content": "18°C, cloudy",
            })
        );
    }
}
