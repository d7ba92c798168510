//! Anthropic Messages API provider.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::types::ContentBlock;

use super::http::{anthropic_headers, shared_client, status_to_error};
use super::{ModelProvider, ModelRequest, ModelResponse, StopReason};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    model: String,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(model: impl Into<String>, api_key: String, base_url: Option<String>) -> Self {
        Self {
            model: model.into(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    fn build_request_body(&self, request: &ModelRequest) -> serde_json::Value {
        let messages: Vec<serde_json::Value> = request
            .messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role,
                    "content": build_content(&msg.content),
                })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": request.max_tokens,
        });

        if !request.tools.is_empty() {
            let tool_defs: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.input_schema,
                    })
                })
                .collect();
            body["tools"] = tool_defs.into();
        }

        body
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let body = self.build_request_body(request);
        let url = format!("{}/messages", self.base_url);

        debug!(model = %self.model, messages = request.messages.len(), "Anthropic generate");

        let resp = shared_client()
            .post(&url)
            .headers(anthropic_headers(&self.api_key, API_VERSION))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: AnthropicResponse = resp.json().await?;
        parse_response(data)
    }
}

/// Serialize history content; single-text-block content collapses to a plain
/// string, everything else passes through as a typed block list.
fn build_content(blocks: &[ContentBlock]) -> serde_json::Value {
    if let [ContentBlock::Text { text }] = blocks {
        return serde_json::Value::String(text.clone());
    }
    serde_json::json!(blocks)
}

fn parse_response(data: AnthropicResponse) -> Result<ModelResponse> {
    let mut content = Vec::with_capacity(data.content.len());

    for block in data.content {
        match block.r#type.as_str() {
            "text" => {
                let text = block.text.ok_or_else(|| {
                    ChatError::Protocol("text block missing text field".into())
                })?;
                content.push(ContentBlock::Text { text });
            }
            "tool_use" => match (block.id, block.name, block.input) {
                (Some(id), Some(name), Some(input)) => {
                    content.push(ContentBlock::ToolUse { id, name, input });
                }
                _ => {
                    return Err(ChatError::Protocol(
                        "tool_use block missing id, name, or input".into(),
                    ))
                }
            },
            // Unknown block kinds (e.g. thinking) carry nothing this client consumes.
            _ => {}
        }
    }

    let stop_reason = match data.stop_reason.as_deref() {
        Some("end_turn") => Some(StopReason::EndTurn),
        Some("max_tokens") => Some(StopReason::MaxTokens),
        Some("tool_use") => Some(StopReason::ToolUse),
        _ => None,
    };

    Ok(ModelResponse {
        content,
        stop_reason,
    })
}

// Internal Anthropic response types

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    stop_reason: Option<String>,
}

#[derive(Deserialize)]
struct AnthropicContentBlock {
    r#type: String,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    input: Option<serde_json::Value>,
}
