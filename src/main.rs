//! paperchat binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use paperchat::cli::Cli;
use paperchat::config::ChatConfig;
use paperchat::dispatch::CommandDispatcher;
use paperchat::engine::{ConversationEngine, EngineEvent};
use paperchat::mcp::McpClient;
use paperchat::provider::anthropic::AnthropicProvider;
use paperchat::registry::{CapabilityRegistry, SharedSession};
use paperchat::shell::ChatShell;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> paperchat::Result<()> {
    let cli = Cli::parse();
    let config = ChatConfig::from_env()?;

    let provider = AnthropicProvider::new(
        cli.resolved_model(&config),
        config.api_key.clone(),
        config.base_url.clone(),
    );

    // A connection failure here aborts startup; no chat loop begins.
    let transport = cli.transport(&config)?;
    let client = McpClient::connect(transport.as_ref()).await?;

    let sessions: Vec<SharedSession> = vec![Arc::new(client)];
    let registry = Arc::new(CapabilityRegistry::discover(sessions).await?);
    println!(
        "Connected with tools: {:?}",
        registry
            .tools()
            .iter()
            .map(|tool| tool.name.as_str())
            .collect::<Vec<_>>()
    );

    let engine = ConversationEngine::new(Arc::new(provider), Arc::clone(&registry), cli.max_tokens)
        .with_event_sink(Arc::new(|event: EngineEvent| match event {
            EngineEvent::ToolCallStarted { id, name, args } => {
                println!("Calling tool: {name} (ID: {id}) with args: {args}");
            }
            EngineEvent::AssistantText { text } => {
                println!("{text}");
            }
        }));

    let shell = ChatShell::new(CommandDispatcher::new(registry, engine));
    shell.run().await
}
