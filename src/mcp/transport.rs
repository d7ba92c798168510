//! MCP transport layer.

use async_trait::async_trait;
use rmcp::model::ClientInfo;
use rmcp::service::{ClientInitializeError, DynService, RoleClient, RunningService, ServiceExt};
use rmcp::transport::{StreamableHttpClientTransport, TokioChildProcess};
use tokio::process::Command;

type DynClientService = Box<dyn DynService<RoleClient>>;
pub type McpRunningService = RunningService<RoleClient, DynClientService>;

/// Transport trait for establishing an MCP session.
#[async_trait]
pub trait McpTransport: Send + Sync {
    /// Connect and run the MCP initialization handshake.
    async fn connect(
        &self,
        client_info: ClientInfo,
    ) -> Result<McpRunningService, ClientInitializeError>;
}

/// Streamable-HTTP transport for remote MCP servers.
pub struct StreamableHttpTransport {
    url: String,
}

impl StreamableHttpTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl McpTransport for StreamableHttpTransport {
    async fn connect(
        &self,
        client_info: ClientInfo,
    ) -> Result<McpRunningService, ClientInitializeError> {
        let transport = StreamableHttpClientTransport::from_uri(self.url.clone());
        client_info.into_dyn().serve(transport).await
    }
}

/// Stdio child-process transport for local MCP servers.
pub struct StdioTransport {
    command: String,
    args: Vec<String>,
}

impl StdioTransport {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_command(command: impl Into<String>) -> Self {
        Self::new(command, Vec::new())
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn connect(
        &self,
        client_info: ClientInfo,
    ) -> Result<McpRunningService, ClientInitializeError> {
        let mut command = Command::new(&self.command);
        command.args(&self.args);
        let transport = TokioChildProcess::new(command).map_err(|error| {
            ClientInitializeError::transport::<TokioChildProcess>(error, "spawn stdio transport")
        })?;
        client_info.into_dyn().serve(transport).await
    }
}
