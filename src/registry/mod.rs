//! Capability registry: routes tool/prompt names and resource URIs to the
//! session that advertised them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{CapabilityKind, ChatError, Result};
use crate::types::{
    PromptDescriptor, PromptMessage, ResourceContent, ToolCallOutcome, ToolDescriptor,
};

/// One initialized connection to a capability provider.
///
/// Three discovery operations plus three call-time operations; the concrete
/// implementation is the MCP client, fakes implement it in tests.
#[async_trait]
pub trait CapabilitySession: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>>;
    async fn list_prompts(&self) -> Result<Vec<PromptDescriptor>>;
    async fn list_resources(&self) -> Result<Vec<String>>;

    async fn call_tool(&self, name: &str, arguments: serde_json::Value)
        -> Result<ToolCallOutcome>;
    async fn read_resource(&self, uri: &str) -> Result<Vec<ResourceContent>>;
    async fn get_prompt(
        &self,
        name: &str,
        arguments: HashMap<String, String>,
    ) -> Result<Vec<PromptMessage>>;
}

impl std::fmt::Debug for dyn CapabilitySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CapabilitySession")
    }
}

pub type SharedSession = Arc<dyn CapabilitySession>;

/// In-memory index built once at startup; read-only thereafter.
#[derive(Debug)]
pub struct CapabilityRegistry {
    tools: Vec<ToolDescriptor>,
    prompts: Vec<PromptDescriptor>,
    tool_sessions: HashMap<String, SharedSession>,
    prompt_sessions: HashMap<String, SharedSession>,
    resource_sessions: HashMap<String, SharedSession>,
}

impl CapabilityRegistry {
    /// Enumerate tools, prompts, and resources from every session and record
    /// which session serves each name or URI.
    ///
    /// Duplicate tool or prompt names across sessions are a configuration
    /// error; last-write-wins routing would silently shadow a provider.
    pub async fn discover(sessions: Vec<SharedSession>) -> Result<Self> {
        let mut registry = Self {
            tools: Vec::new(),
            prompts: Vec::new(),
            tool_sessions: HashMap::new(),
            prompt_sessions: HashMap::new(),
            resource_sessions: HashMap::new(),
        };

        for session in sessions {
            for tool in session.list_tools().await? {
                if registry
                    .tool_sessions
                    .insert(tool.name.clone(), Arc::clone(&session))
                    .is_some()
                {
                    return Err(ChatError::Configuration(format!(
                        "duplicate tool name '{}'",
                        tool.name
                    )));
                }
                registry.tools.push(tool);
            }

            for prompt in session.list_prompts().await? {
                if registry
                    .prompt_sessions
                    .insert(prompt.name.clone(), Arc::clone(&session))
                    .is_some()
                {
                    return Err(ChatError::Configuration(format!(
                        "duplicate prompt name '{}'",
                        prompt.name
                    )));
                }
                registry.prompts.push(prompt);
            }

            for uri in session.list_resources().await? {
                registry
                    .resource_sessions
                    .insert(uri, Arc::clone(&session));
            }
        }

        debug!(
            tools = registry.tools.len(),
            prompts = registry.prompts.len(),
            resources = registry.resource_sessions.len(),
            "capability discovery complete"
        );
        Ok(registry)
    }

    /// The complete tool list, in the shape the model API expects.
    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn prompts(&self) -> &[PromptDescriptor] {
        &self.prompts
    }

    pub fn session_for_tool(&self, name: &str) -> Result<SharedSession> {
        self.tool_sessions
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::lookup(CapabilityKind::Tool, name))
    }

    pub fn session_for_prompt(&self, name: &str) -> Result<SharedSession> {
        self.prompt_sessions
            .get(name)
            .cloned()
            .ok_or_else(|| ChatError::lookup(CapabilityKind::Prompt, name))
    }

    /// Resolve a resource URI: exact match first, then fall back to any
    /// registered URI sharing the same `scheme://` namespace prefix.
    pub fn session_for_resource(&self, uri: &str) -> Result<SharedSession> {
        if let Some(session) = self.resource_sessions.get(uri) {
            return Ok(Arc::clone(session));
        }

        if let Some(prefix) = namespace_prefix(uri) {
            if let Some(session) = self
                .resource_sessions
                .iter()
                .find(|(registered, _)| registered.starts_with(prefix))
                .map(|(_, session)| Arc::clone(session))
            {
                return Ok(session);
            }
        }

        Err(ChatError::lookup(CapabilityKind::Resource, uri))
    }
}

/// The `scheme://` prefix of a URI, if it has one.
fn namespace_prefix(uri: &str) -> Option<&str> {
    uri.find("://").map(|idx| &uri[..idx + 3])
}
