//! Conversation engine: drives the model/tool round-trip loop for one query.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::provider::{ModelProvider, ModelRequest};
use crate::registry::CapabilityRegistry;
use crate::types::{ContentBlock, Message};

/// Observable engine events, emitted through the sink as the loop runs.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Emitted before each tool dispatch.
    ToolCallStarted {
        id: String,
        name: String,
        args: serde_json::Value,
    },
    /// Emitted once per text block of the final response, in block order.
    AssistantText { text: String },
}

pub type EventSink = Arc<dyn Fn(EngineEvent) + Send + Sync>;

/// Result of one processed query: the final answer and the full transcript.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub answer: String,
    pub messages: Vec<Message>,
}

/// Owns the per-query message history; provider and registry are injected.
pub struct ConversationEngine {
    provider: Arc<dyn ModelProvider>,
    registry: Arc<CapabilityRegistry>,
    max_tokens: u32,
    event_sink: Option<EventSink>,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        registry: Arc<CapabilityRegistry>,
        max_tokens: u32,
    ) -> Self {
        Self {
            provider,
            registry,
            max_tokens,
            event_sink: None,
        }
    }

    pub fn with_event_sink(mut self, sink: EventSink) -> Self {
        self.event_sink = Some(sink);
        self
    }

    fn emit(&self, event: EngineEvent) {
        if let Some(sink) = &self.event_sink {
            sink(event);
        }
    }

    /// Run the turn loop for one user query.
    ///
    /// Terminates on the first response with no tool-use blocks; every round
    /// of tool results is appended as exactly one user message, matched to
    /// the requests by identifier and order.
    pub async fn process_query(&self, query: &str) -> Result<QueryOutcome> {
        let mut messages = vec![Message::user(query)];

        loop {
            let response = self
                .provider
                .generate(&ModelRequest {
                    messages: messages.clone(),
                    tools: self.registry.tools().to_vec(),
                    max_tokens: self.max_tokens,
                })
                .await?;

            messages.push(Message::assistant(response.content.clone()));

            let tool_uses: Vec<_> = response
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            if tool_uses.is_empty() {
                let answer: String = response
                    .content
                    .iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text.as_str()),
                        _ => None,
                    })
                    .collect();
                for block in &response.content {
                    if let ContentBlock::Text { text } = block {
                        self.emit(EngineEvent::AssistantText { text: text.clone() });
                    }
                }
                return Ok(QueryOutcome { answer, messages });
            }

            let mut results = Vec::with_capacity(tool_uses.len());
            for (id, name, args) in tool_uses {
                self.emit(EngineEvent::ToolCallStarted {
                    id: id.clone(),
                    name: name.clone(),
                    args: args.clone(),
                });
                debug!(tool = %name, id = %id, "dispatching tool call");

                let session = self.registry.session_for_tool(&name)?;
                let outcome = session.call_tool(&name, args).await?;
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id,
                    content: stringify(outcome.into_value_or_text()),
                });
            }

            // One user message per round, carrying every result of the round.
            messages.push(Message::tool_results(results));
        }
    }
}

/// Stringify a tool result payload; bare strings stay unquoted.
fn stringify(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text,
        other => other.to_string(),
    }
}
