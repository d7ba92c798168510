//! Model provider boundary.

pub mod anthropic;
pub mod http;

pub use anthropic::AnthropicProvider;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ContentBlock, Message, ToolDescriptor};

/// One model call: full history, the complete tool list, and an output cap.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    pub tools: Vec<ToolDescriptor>,
    pub max_tokens: u32,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    MaxTokens,
    ToolUse,
}

/// A model response: an ordered list of typed content blocks.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<StopReason>,
}

/// A conversational inference service.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn model_id(&self) -> &str;

    async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse>;
}
