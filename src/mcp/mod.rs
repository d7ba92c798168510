//! MCP client and transports.

pub mod client;
pub mod transport;

pub use client::McpClient;
pub use transport::{McpTransport, StdioTransport, StreamableHttpTransport};
