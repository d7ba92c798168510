//! Integration tests for the Anthropic provider against a stubbed HTTP server.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paperchat::engine::ConversationEngine;
use paperchat::error::ChatError;
use paperchat::provider::anthropic::AnthropicProvider;
use paperchat::provider::{ModelProvider, ModelRequest, StopReason};
use paperchat::registry::{CapabilityRegistry, CapabilitySession};
use paperchat::types::{
    ContentBlock, Message, PromptDescriptor, PromptMessage, ResourceContent, ToolCallOutcome,
    ToolDescriptor,
};

use async_trait::async_trait;
use std::collections::HashMap;

async fn provider_for(server: &MockServer) -> AnthropicProvider {
    AnthropicProvider::new(
        "claude-opus-4-5-20251101",
        "test-key".to_string(),
        Some(server.uri()),
    )
}

fn weather_tool() -> ToolDescriptor {
    ToolDescriptor {
        name: "get_weather".into(),
        description: "Look up weather".into(),
        input_schema: json!({
            "type": "object",
            "properties": {"city": {"type": "string"}},
            "required": ["city"],
        }),
    }
}

#[tokio::test]
async fn generate_sends_headers_tools_and_parses_tool_use() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-opus-4-5-20251101",
            "max_tokens": 2024,
            "messages": [{"role": "user", "content": "What is the weather in Paris?"}],
            "tools": [{"name": "get_weather"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "tool_use", "id": "t1", "name": "get_weather", "input": {"city": "Paris"}},
            ],
            "stop_reason": "tool_use",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let response = provider
        .generate(&ModelRequest {
            messages: vec![Message::user("What is the weather in Paris?")],
            tools: vec![weather_tool()],
            max_tokens: 2024,
        })
        .await
        .unwrap();

    assert_eq!(response.stop_reason, Some(StopReason::ToolUse));
    assert_eq!(
        response.content,
        vec![ContentBlock::ToolUse {
            id: "t1".into(),
            name: "get_weather".into(),
            input: json!({"city": "Paris"}),
        }]
    );
}

#[tokio::test]
async fn generate_maps_401_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"error": {"message": "invalid x-api-key"}})),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let err = provider
        .generate(&ModelRequest {
            messages: vec![Message::user("hi")],
            tools: vec![],
            max_tokens: 2024,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Authentication(_)));
}

#[tokio::test]
async fn generate_maps_500_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let err = provider
        .generate(&ModelRequest {
            messages: vec![Message::user("hi")],
            tools: vec![],
            max_tokens: 2024,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Api { status: 500, .. }));
}

struct WeatherSession;

#[async_trait]
impl CapabilitySession for WeatherSession {
    async fn list_tools(&self) -> paperchat::Result<Vec<ToolDescriptor>> {
        Ok(vec![weather_tool()])
    }

    async fn list_prompts(&self) -> paperchat::Result<Vec<PromptDescriptor>> {
        Ok(Vec::new())
    }

    async fn list_resources(&self) -> paperchat::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> paperchat::Result<ToolCallOutcome> {
        assert_eq!(name, "get_weather");
        assert_eq!(arguments, json!({"city": "Paris"}));
        Ok(ToolCallOutcome {
            structured_content: None,
            text_content: Some("18°C, cloudy".into()),
            content: Vec::new(),
        })
    }

    async fn read_resource(&self, _uri: &str) -> paperchat::Result<Vec<ResourceContent>> {
        Ok(Vec::new())
    }

    async fn get_prompt(
        &self,
        _name: &str,
        _arguments: HashMap<String, String>,
    ) -> paperchat::Result<Vec<PromptMessage>> {
        Ok(Vec::new())
    }
}

/// Full engine round-trip over HTTP: tool_use response, tool result echoed
/// back in the second request's history, final text answer.
#[tokio::test]
async fn engine_round_trips_tool_results_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "messages": [{"role": "user", "content": "What is the weather in Paris?"}],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "tool_use", "id": "t1", "name": "get_weather", "input": {"city": "Paris"}},
            ],
            "stop_reason": "tool_use",
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/messages"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "user", "content": "What is the weather in Paris?"},
                {"role": "assistant", "content": [
                    {"type": "tool_use", "id": "t1", "name": "get_weather", "input": {"city": "Paris"}},
                ]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "t1", "content": "18°C, cloudy"},
                ]},
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "It is 18°C and cloudy in Paris."}],
            "stop_reason": "end_turn",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server).await;
    let registry = Arc::new(
        CapabilityRegistry::discover(vec![Arc::new(WeatherSession)])
            .await
            .unwrap(),
    );
    let engine = ConversationEngine::new(Arc::new(provider), registry, 2024);

    let outcome = engine
        .process_query("What is the weather in Paris?")
        .await
        .unwrap();
    assert_eq!(outcome.answer, "It is 18°C and cloudy in Paris.");
}
