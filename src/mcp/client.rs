//! MCP client for connecting to MCP servers.

use std::collections::HashMap;

use async_trait::async_trait;
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, Content, GetPromptRequestParams, JsonObject,
        ProtocolVersion, ReadResourceRequestParams, ResourceContents,
    },
    service::{ClientInitializeError, ServiceError},
};
use tracing::debug;

use crate::error::{ChatError, Result};
use crate::registry::CapabilitySession;
use crate::types::{
    PromptArgumentDescriptor, PromptContent, PromptDescriptor, PromptMessage, PromptPart,
    ResourceContent, ToolCallOutcome, ToolDescriptor,
};

use super::transport::{McpRunningService, McpTransport};

/// JSON-RPC code a server answers with when it lacks a capability.
const METHOD_NOT_FOUND: i32 = -32601;

/// Client for one Model Context Protocol server.
pub struct McpClient {
    session: McpRunningService,
}

impl McpClient {
    /// Connect through the given transport, retrying the handshake once with
    /// an older protocol version when the server rejects the latest one.
    pub async fn connect(transport: &dyn McpTransport) -> Result<Self> {
        let latest = rmcp::model::ClientInfo {
            protocol_version: ProtocolVersion::LATEST,
            ..Default::default()
        };

        match transport.connect(latest).await {
            Ok(session) => return Ok(Self { session }),
            Err(error) if should_retry_protocol_fallback(&error) => {
                debug!("MCP initialize rejected, retrying with protocol fallback");
            }
            Err(error) => return Err(map_client_initialize_error(error)),
        }

        let fallback = rmcp::model::ClientInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            ..Default::default()
        };
        let session = transport
            .connect(fallback)
            .await
            .map_err(map_client_initialize_error)?;
        Ok(Self { session })
    }

    /// Wrap an already-running rmcp service (handshake done by `serve`).
    pub fn from_running_service(session: McpRunningService) -> Self {
        Self { session }
    }
}

#[async_trait]
impl CapabilitySession for McpClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        let tools = match self.session.list_all_tools().await {
            Ok(tools) => tools,
            Err(ServiceError::UnexpectedResponse) => {
                let page = self
                    .session
                    .list_tools(None)
                    .await
                    .map_err(|e| map_service_error("list_tools", e))?;
                page.tools
            }
            Err(e) => return Err(map_service_error("list_tools", e)),
        };

        Ok(tools.into_iter().map(map_tool).collect())
    }

    async fn list_prompts(&self) -> Result<Vec<PromptDescriptor>> {
        match self.session.list_all_prompts().await {
            Ok(prompts) => Ok(prompts.into_iter().map(map_prompt).collect()),
            Err(e) if is_method_not_found(&e) => {
                debug!("server does not advertise prompts");
                Ok(Vec::new())
            }
            Err(e) => Err(map_service_error("list_prompts", e)),
        }
    }

    async fn list_resources(&self) -> Result<Vec<String>> {
        match self.session.list_all_resources().await {
            Ok(resources) => Ok(resources
                .into_iter()
                .map(|resource| resource.uri.clone())
                .collect()),
            Err(e) if is_method_not_found(&e) => {
                debug!("server does not advertise resources");
                Ok(Vec::new())
            }
            Err(e) => Err(map_service_error("list_resources", e)),
        }
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolCallOutcome> {
        let arguments = coerce_tool_arguments(arguments)?;

        let result = self
            .session
            .call_tool(CallToolRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
                task: None,
            })
            .await
            .map_err(|e| map_service_error("call_tool", e))?;

        map_call_result(name, result)
    }

    async fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContent>> {
        let result = self
            .session
            .read_resource(ReadResourceRequestParams {
                meta: None,
                uri: uri.to_owned().into(),
            })
            .await
            .map_err(|e| map_service_error("read_resource", e))?;

        Ok(result
            .contents
            .into_iter()
            .map(|contents| ResourceContent {
                text: match contents {
                    ResourceContents::TextResourceContents { text, .. } => Some(text),
                    _ => None,
                },
            })
            .collect())
    }

    async fn get_prompt(
        &self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> Result<Vec<PromptMessage>> {
        let arguments = if arguments.is_empty() {
            None
        } else {
            let mut object = JsonObject::new();
            for (key, value) in arguments {
                object.insert(key, serde_json::Value::String(value));
            }
            Some(object)
        };

        let result = self
            .session
            .get_prompt(GetPromptRequestParams {
                meta: None,
                name: name.to_owned().into(),
                arguments,
            })
            .await
            .map_err(|e| map_service_error("get_prompt", e))?;

        Ok(result
            .messages
            .into_iter()
            .map(map_prompt_message)
            .collect())
    }
}

fn map_tool(tool: rmcp::model::Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
        input_schema: serde_json::Value::Object((*tool.input_schema).clone()),
    }
}

fn map_prompt(prompt: rmcp::model::Prompt) -> PromptDescriptor {
    PromptDescriptor {
        name: prompt.name.to_string(),
        description: prompt
            .description
            .map(|d| d.to_string())
            .unwrap_or_default(),
        arguments: prompt
            .arguments
            .unwrap_or_default()
            .into_iter()
            .map(|arg| PromptArgumentDescriptor {
                name: arg.name.to_string(),
                description: arg.description.map(|d| d.to_string()),
            })
            .collect(),
    }
}

/// Resolve prompt content into an explicit variant at the boundary.
fn map_prompt_message(message: rmcp::model::PromptMessage) -> PromptMessage {
    let content = match message.content {
        rmcp::model::PromptMessageContent::Text { text } => PromptContent::Text(text),
        rmcp::model::PromptMessageContent::Resource { resource } => {
            let text = match &resource.resource {
                ResourceContents::TextResourceContents { text, .. } => Some(text.clone()),
                _ => None,
            };
            PromptContent::Parts(vec![PromptPart { text }])
        }
        _ => PromptContent::Parts(vec![PromptPart { text: None }]),
    };
    PromptMessage { content }
}

fn coerce_tool_arguments(value: serde_json::Value) -> Result<Option<JsonObject>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) => Ok(Some(map)),
        serde_json::Value::String(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            let parsed: serde_json::Value = serde_json::from_str(trimmed).map_err(|e| {
                ChatError::Protocol(format!("tool arguments must be valid JSON: {e}"))
            })?;
            coerce_tool_arguments(parsed)
        }
        other => Err(ChatError::Protocol(format!(
            "tool arguments must be a JSON object; got {other}"
        ))),
    }
}

fn extract_text_content(content: &[Content]) -> Option<String> {
    let mut lines = Vec::new();
    for item in content {
        if let Some(text) = item.as_text() {
            lines.push(text.text.clone());
            continue;
        }
        if let Some(resource) = item.as_resource() {
            if let ResourceContents::TextResourceContents { text, .. } = &resource.resource {
                lines.push(text.clone());
            }
        }
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn map_call_result(name: &str, result: CallToolResult) -> Result<ToolCallOutcome> {
    let text_content = extract_text_content(&result.content);
    let content = result
        .content
        .iter()
        .filter_map(|item| serde_json::to_value(item).ok())
        .collect::<Vec<_>>();

    if result.is_error.unwrap_or(false) {
        let message = result
            .structured_content
            .as_ref()
            .map(|v| v.to_string())
            .or_else(|| text_content.clone())
            .unwrap_or_else(|| "tool returned an error result".into());

        return Err(ChatError::ToolExecution {
            tool_name: name.to_string(),
            message,
        });
    }

    Ok(ToolCallOutcome {
        structured_content: result.structured_content,
        text_content,
        content,
    })
}

fn is_method_not_found(error: &ServiceError) -> bool {
    matches!(error, ServiceError::McpError(data) if data.code.0 == METHOD_NOT_FOUND)
}

fn should_retry_protocol_fallback(error: &ClientInitializeError) -> bool {
    matches!(
        error,
        ClientInitializeError::JsonRpcError(_) | ClientInitializeError::ConnectionClosed(_)
    )
}

fn map_client_initialize_error(error: ClientInitializeError) -> ChatError {
    match error {
        ClientInitializeError::ConnectionClosed(context) => {
            ChatError::Connection(format!("MCP initialize connection closed: {context}"))
        }
        ClientInitializeError::TransportError { error, context } => ChatError::Connection(
            format!("MCP initialize transport error ({context}): {error}"),
        ),
        ClientInitializeError::JsonRpcError(error) => ChatError::Protocol(format!(
            "MCP initialize JSON-RPC error {}: {}",
            error.code.0, error.message
        )),
        ClientInitializeError::Cancelled => {
            ChatError::Connection("MCP initialize cancelled".into())
        }
        other => ChatError::Connection(format!("MCP initialize error: {other}")),
    }
}

fn map_service_error(context: &str, error: ServiceError) -> ChatError {
    match error {
        ServiceError::McpError(error) => ChatError::Protocol(format!(
            "{context}: MCP error {}: {}",
            error.code.0, error.message
        )),
        ServiceError::TransportSend(error) => {
            ChatError::Connection(format!("{context}: MCP transport send failed: {error}"))
        }
        ServiceError::TransportClosed => {
            ChatError::Connection(format!("{context}: MCP transport closed"))
        }
        ServiceError::UnexpectedResponse => {
            ChatError::Protocol(format!("{context}: unexpected MCP response"))
        }
        ServiceError::Cancelled { reason } => {
            let suffix = reason
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default();
            ChatError::Connection(format!("{context}: MCP request cancelled{suffix}"))
        }
        ServiceError::Timeout { timeout } => ChatError::Connection(format!(
            "{context}: MCP request timed out after {}ms",
            timeout.as_millis()
        )),
        other => ChatError::Connection(format!("{context}: MCP service error: {other}")),
    }
}
