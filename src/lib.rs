//! Interactive chat client that pairs the Anthropic Messages API with
//! capabilities discovered from MCP servers: tools the model can invoke,
//! resources addressable by URI, and parameterized prompts.

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod provider;
pub mod registry;
pub mod shell;
pub mod types;

pub use error::{ChatError, Result};
