//! Line-oriented read-eval loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::dispatch::{CommandDispatcher, DispatchOutcome};
use crate::error::Result;

const BANNER: &str = "Chat started. Type your queries, '@<topic>' for resources, \
                      '/prompts' to list prompts, or 'quit' to exit.";

pub struct ChatShell {
    dispatcher: CommandDispatcher,
}

impl ChatShell {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run against the process's stdin/stdout until quit or end-of-input.
    pub async fn run(&self) -> Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let writer = tokio::io::stdout();
        self.run_with(reader, writer).await
    }

    /// One line per iteration; dispatch failures are reported and the loop
    /// continues with the next input.
    pub async fn run_with(
        &self,
        reader: impl AsyncBufRead + Unpin,
        mut writer: impl AsyncWrite + Unpin,
    ) -> Result<()> {
        writer.write_all(BANNER.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        let mut lines = reader.lines();
        loop {
            writer.write_all(b"\nQuery: ").await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            match self.dispatcher.dispatch(&line).await {
                Ok(DispatchOutcome::Exit) => break,
                Ok(DispatchOutcome::Handled) => {}
                Ok(DispatchOutcome::Reply(reply)) => {
                    writer.write_all(reply.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                }
                Err(error) => {
                    warn!(%error, "turn failed");
                    writer
                        .write_all(format!("Error: {error}\n").as_bytes())
                        .await?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ConversationEngine;
    use crate::error::ChatError;
    use crate::provider::{ModelProvider, ModelRequest, ModelResponse};
    use crate::registry::{CapabilityRegistry, CapabilitySession};
    use crate::types::{
        ContentBlock, PromptDescriptor, PromptMessage, ResourceContent, ToolCallOutcome,
        ToolDescriptor,
    };
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct EchoProvider;

    #[async_trait]
    impl ModelProvider for EchoProvider {
        fn model_id(&self) -> &str {
            "echo"
        }

        async fn generate(&self, request: &ModelRequest) -> Result<ModelResponse> {
            let query = request.messages[0]
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.clone()),
                    _ => None,
                })
                .collect::<String>();
            if query.contains("fail") {
                return Err(ChatError::Protocol("model refused".into()));
            }
            Ok(ModelResponse {
                content: vec![ContentBlock::Text {
                    text: format!("echo: {query}"),
                }],
                stop_reason: None,
            })
        }
    }

    struct BareSession;

    #[async_trait]
    impl CapabilitySession for BareSession {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
            Ok(Vec::new())
        }

        async fn list_prompts(&self) -> Result<Vec<PromptDescriptor>> {
            Ok(Vec::new())
        }

        async fn list_resources(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn call_tool(
            &self,
            name: &str,
            _arguments: serde_json::Value,
        ) -> Result<ToolCallOutcome> {
            Err(ChatError::ToolExecution {
                tool_name: name.into(),
                message: "no tools".into(),
            })
        }

        async fn read_resource(&self, _uri: &str) -> Result<Vec<ResourceContent>> {
            Ok(Vec::new())
        }

        async fn get_prompt(
            &self,
            _name: &str,
            _arguments: HashMap<String, String>,
        ) -> Result<Vec<PromptMessage>> {
            Ok(Vec::new())
        }
    }

    async fn shell() -> ChatShell {
        let registry = Arc::new(
            CapabilityRegistry::discover(vec![Arc::new(BareSession)])
                .await
                .expect("discovery should succeed"),
        );
        let engine = ConversationEngine::new(Arc::new(EchoProvider), Arc::clone(&registry), 2024);
        ChatShell::new(CommandDispatcher::new(registry, engine))
    }

    async fn run_script(input: &str) -> String {
        let shell = shell().await;
        let mut output = Vec::new();
        shell
            .run_with(BufReader::new(input.as_bytes()), &mut output)
            .await
            .expect("shell loop should not fail");
        String::from_utf8(output).expect("shell output should be utf-8")
    }

    #[tokio::test]
    async fn quit_ends_the_loop_after_the_banner() {
        let output = run_script("quit\n").await;
        assert!(output.starts_with(BANNER));
        assert_eq!(output.matches("Query: ").count(), 1);
    }

    #[tokio::test]
    async fn replies_are_printed_and_the_loop_continues() {
        let output = run_script("/prompts\nquit\n").await;
        assert!(output.contains("No prompts available."));
        assert_eq!(output.matches("Query: ").count(), 2);
    }

    #[tokio::test]
    async fn a_failed_turn_is_reported_and_does_not_end_the_session() {
        let output = run_script("please fail\n/prompts\nquit\n").await;
        assert!(output.contains("Error: "));
        assert!(output.contains("No prompts available."));
        assert_eq!(output.matches("Query: ").count(), 3);
    }

    #[tokio::test]
    async fn end_of_input_ends_the_loop() {
        let output = run_script("/prompts\n").await;
        assert!(output.contains("No prompts available."));
    }
}
