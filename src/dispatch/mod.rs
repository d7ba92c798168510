//! Command dispatcher: classifies one line of user input and routes it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::ConversationEngine;
use crate::error::{ChatError, Result};
use crate::registry::CapabilityRegistry;
use crate::types::PromptDescriptor;

const PROMPT_USAGE: &str = "Usage: /prompt <name> [arg1=value1 arg2=value2 ...]";

/// One classified input line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    FetchResource { uri: String },
    ListPrompts,
    RunPrompt {
        name: String,
        args: HashMap<String, String>,
    },
    PromptUsage,
    Unknown(String),
    Query(String),
}

/// What the shell should do with a handled line.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// End the read-eval loop.
    Exit,
    /// Fully handled; any output already went through the engine's sink.
    Handled,
    /// Print this reply verbatim.
    Reply(String),
}

/// Classify one line. Empty input and `quit` (any case) end the session.
pub fn parse_line(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() || line.eq_ignore_ascii_case("quit") {
        return Command::Quit;
    }

    if let Some(topic) = line.strip_prefix('@') {
        return Command::FetchResource {
            uri: format!("papers://{topic}"),
        };
    }

    if line.starts_with('/') {
        let mut tokens = line.split_whitespace();
        let command = tokens.next().unwrap_or(line).to_ascii_lowercase();
        return match command.as_str() {
            "/prompts" => Command::ListPrompts,
            "/prompt" => match tokens.next() {
                Some(name) => Command::RunPrompt {
                    name: name.to_owned(),
                    args: parse_prompt_args(tokens),
                },
                None => Command::PromptUsage,
            },
            _ => Command::Unknown(command),
        };
    }

    Command::Query(line.to_owned())
}

/// Trailing `key=value` tokens; anything without `=` is dropped.
fn parse_prompt_args<'a>(tokens: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
    tokens
        .filter_map(|token| {
            token
                .split_once('=')
                .map(|(key, value)| (key.to_owned(), value.to_owned()))
        })
        .collect()
}

pub fn format_prompt_listing(prompts: &[PromptDescriptor]) -> String {
    if prompts.is_empty() {
        return "No prompts available.".to_owned();
    }

    let mut listing = String::from("Available prompts:");
    for prompt in prompts {
        listing.push_str(&format!("\n- {}: {}", prompt.name, prompt.description));
        if !prompt.arguments.is_empty() {
            listing.push_str("\n  Arguments:");
            for argument in &prompt.arguments {
                listing.push_str(&format!("\n    - {}", argument.name));
            }
        }
    }
    listing
}

/// Routes parsed commands to the engine or to direct registry lookups.
pub struct CommandDispatcher {
    registry: Arc<CapabilityRegistry>,
    engine: ConversationEngine,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CapabilityRegistry>, engine: ConversationEngine) -> Self {
        Self { registry, engine }
    }

    pub async fn dispatch(&self, line: &str) -> Result<DispatchOutcome> {
        match parse_line(line) {
            Command::Quit => Ok(DispatchOutcome::Exit),
            Command::FetchResource { uri } => self.fetch_resource(&uri).await,
            Command::ListPrompts => Ok(DispatchOutcome::Reply(format_prompt_listing(
                self.registry.prompts(),
            ))),
            Command::RunPrompt { name, args } => self.run_prompt(&name, args).await,
            Command::PromptUsage => Ok(DispatchOutcome::Reply(PROMPT_USAGE.to_owned())),
            Command::Unknown(command) => Ok(DispatchOutcome::Reply(format!(
                "Unknown command: {command}"
            ))),
            Command::Query(query) => {
                self.engine.process_query(&query).await?;
                Ok(DispatchOutcome::Handled)
            }
        }
    }

    async fn fetch_resource(&self, uri: &str) -> Result<DispatchOutcome> {
        let session = self.registry.session_for_resource(uri)?;
        let contents = session.read_resource(uri).await?;
        let reply = contents
            .into_iter()
            .find_map(|content| content.text)
            .unwrap_or_else(|| "No content available.".to_owned());
        Ok(DispatchOutcome::Reply(reply))
    }

    /// Expand a named prompt and feed the expansion through the engine as a
    /// fresh query.
    async fn run_prompt(
        &self,
        name: &str,
        args: HashMap<String, String>,
    ) -> Result<DispatchOutcome> {
        let session = self.registry.session_for_prompt(name)?;
        let messages = session.get_prompt(name, args).await?;
        let message = messages.into_iter().next().ok_or_else(|| {
            ChatError::Protocol(format!("prompt '{name}' returned no messages"))
        })?;

        self.engine.process_query(&message.content.text()).await?;
        Ok(DispatchOutcome::Handled)
    }
}
