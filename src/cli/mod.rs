//! Command-line interface.

use clap::Parser;

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::mcp::{McpTransport, StdioTransport, StreamableHttpTransport};

pub const DEFAULT_MODEL: &str = "claude-opus-4-5-20251101";
pub const DEFAULT_MAX_TOKENS: u32 = 2024;

#[derive(Parser, Debug)]
#[command(name = "paperchat", version, about = "Interactive chat with MCP-provided tools")]
pub struct Cli {
    /// Streamable-HTTP URL of the MCP server.
    #[arg(long, conflicts_with = "server_command")]
    pub server_url: Option<String>,

    /// Command line to spawn a local stdio MCP server, e.g. "node server.js".
    #[arg(long)]
    pub server_command: Option<String>,

    /// Model identifier; falls back to the environment, then the default.
    #[arg(long)]
    pub model: Option<String>,

    /// Output token cap per model call.
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl Cli {
    /// Flag wins over environment, environment over the built-in default.
    pub fn resolved_model(&self, config: &ChatConfig) -> String {
        self.model
            .clone()
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned())
    }

    /// Pick the transport: `--server-url`, then `--server-command`, then the
    /// environment's server URL.
    pub fn transport(&self, config: &ChatConfig) -> Result<Box<dyn McpTransport>> {
        if let Some(url) = &self.server_url {
            return Ok(Box::new(StreamableHttpTransport::new(url.clone())));
        }
        if let Some(command_line) = &self.server_command {
            let mut parts = command_line.split_whitespace();
            let command = parts.next().ok_or_else(|| {
                ChatError::Configuration("--server-command is empty".into())
            })?;
            let args = parts.map(str::to_owned).collect();
            return Ok(Box::new(StdioTransport::new(command, args)));
        }
        if let Some(url) = &config.server_url {
            return Ok(Box::new(StreamableHttpTransport::new(url.clone())));
        }
        Err(ChatError::Configuration(
            "no MCP server configured; pass --server-url or --server-command".into(),
        ))
    }
}
