// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI provider adapter for the Parley chatbot service.
//!
//! This crate implements [`ProviderAdapter`] for the chat completions
//! endpoint and [`EmbeddingAdapter`] for the embeddings endpoint.

pub mod client;
pub mod types;

use async_trait::async_trait;
use parley_config::ParleyConfig;
use parley_core::error::ParleyError;
use parley_core::traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
use parley_core::types::{
    AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus, ProviderRequest,
    ProviderResponse, TokenUsage,
};
use tracing::{debug, info};

use crate::client::OpenAiClient;
use crate::types::{ApiMessage, ChatCompletionRequest, EmbeddingRequest};

/// OpenAI provider implementing [`ProviderAdapter`] and [`EmbeddingAdapter`].
///
/// API key resolution order: config -> `OPENAI_API_KEY` env var -> error.
pub struct OpenAiProvider {
    client: OpenAiClient,
    embedding_model: String,
}

impl OpenAiProvider {
    /// Creates a new OpenAI provider from the given configuration.
    ///
    /// # API Key Resolution
    /// 1. `config.openai.api_key` if set
    /// 2. `OPENAI_API_KEY` environment variable
    /// 3. Returns error if neither is available
    pub fn new(config: &ParleyConfig) -> Result<Self, ParleyError> {
        let api_key = resolve_api_key(&config.openai.api_key)?;
        let client = OpenAiClient::new(api_key, config.openai.api_base.clone())?;

        info!(
            model = config.openai.model,
            embedding_model = config.openai.embedding_model,
            "OpenAI provider initialized"
        );

        Ok(Self {
            client,
            embedding_model: config.openai.embedding_model.clone(),
        })
    }

    /// Creates a provider with an explicit client (for tests).
    pub fn with_client(client: OpenAiClient, embedding_model: String) -> Self {
        Self {
            client,
            embedding_model,
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, ParleyError> {
        // A full check would make a lightweight API call, but we avoid
        // consuming tokens on health checks.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ParleyError> {
        debug!("OpenAI provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ParleyError> {
        let api_request = ChatCompletionRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|m| ApiMessage {
                    role: m.role.clone(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self.client.chat_completion(&api_request).await?;

        let content = response
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ParleyError::Provider {
                message: "completion returned no choices".into(),
                source: None,
            })?;

        Ok(ProviderResponse {
            id: response.id,
            content,
            model: response.model,
            usage: TokenUsage {
                prompt_tokens: response.usage.prompt_tokens,
                completion_tokens: response.usage.completion_tokens,
            },
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for OpenAiProvider {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ParleyError> {
        let response = self
            .client
            .embeddings(&EmbeddingRequest {
                model: self.embedding_model.clone(),
                input: input.texts,
            })
            .await?;

        // The API may return vectors out of order; index is authoritative.
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        let dimensions = data.first().map(|d| d.embedding.len()).unwrap_or(0);
        Ok(EmbeddingOutput {
            embeddings: data.into_iter().map(|d| d.embedding).collect(),
            dimensions,
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, ParleyError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    std::env::var("OPENAI_API_KEY").map_err(|_| {
        ParleyError::Config(
            "OpenAI API key not found. Set openai.api_key in config or OPENAI_API_KEY environment variable.".into(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::types::ChatTurn;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_provider(base_url: &str) -> OpenAiProvider {
        let client = OpenAiClient::new("sk-test".into(), base_url.into()).unwrap();
        OpenAiProvider::with_client(client, "text-embedding-3-small".into())
    }

    #[test]
    fn resolve_api_key_from_config() {
        let result = resolve_api_key(&Some("sk-test-123".into()));
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), "sk-test-123");
    }

    #[test]
    fn resolve_api_key_none_falls_back_to_env() {
        let result = resolve_api_key(&None);
        // Will succeed if env is set, fail otherwise.
        if result.is_err() {
            let err = result.unwrap_err().to_string();
            assert!(err.contains("API key not found"), "got: {err}");
        }
    }

    #[test]
    fn plugin_adapter_metadata() {
        let provider = test_provider("http://localhost:9");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }

    #[tokio::test]
    async fn complete_maps_turns_and_trims_answer() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "model": "gpt-4.1-nano",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "  Paris.  \n"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 20, "completion_tokens": 3, "total_tokens": 23}
        });

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-4.1-nano",
                "temperature": 0.0,
                "messages": [
                    {"role": "system", "content": "Be brief."},
                    {"role": "user", "content": "Capital of France?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let response = provider
            .complete(ProviderRequest {
                model: "gpt-4.1-nano".into(),
                messages: vec![
                    ChatTurn::new("system", "Be brief."),
                    ChatTurn::new("user", "Capital of France?"),
                ],
                temperature: 0.0,
                max_tokens: None,
            })
            .await
            .unwrap();

        assert_eq!(response.content, "Paris.");
        assert_eq!(response.usage.prompt_tokens, 20);
        assert_eq!(response.usage.completion_tokens, 3);
    }

    #[tokio::test]
    async fn complete_with_no_choices_is_an_error() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "id": "chatcmpl-empty",
            "object": "chat.completion",
            "model": "gpt-4.1-nano",
            "choices": [],
            "usage": {"prompt_tokens": 5, "completion_tokens": 0, "total_tokens": 5}
        });

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let result = provider
            .complete(ProviderRequest {
                model: "gpt-4.1-nano".into(),
                messages: vec![ChatTurn::new("user", "hi")],
                temperature: 0.0,
                max_tokens: None,
            })
            .await;

        assert!(matches!(result, Err(ParleyError::Provider { .. })));
    }

    #[tokio::test]
    async fn embed_orders_vectors_by_index() {
        let server = MockServer::start().await;

        // Deliberately out of order.
        let body = serde_json::json!({
            "object": "list",
            "model": "text-embedding-3-small",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [1.0, 1.0]},
                {"object": "embedding", "index": 0, "embedding": [0.0, 0.0]}
            ],
            "usage": {"prompt_tokens": 6, "total_tokens": 6}
        });

        Mock::given(method("POST"))
            .and(path("/embeddings"))
            .and(body_partial_json(serde_json::json!({
                "model": "text-embedding-3-small",
                "input": ["first", "second"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let provider = test_provider(&server.uri());
        let output = provider
            .embed(EmbeddingInput {
                texts: vec!["first".into(), "second".into()],
            })
            .await
            .unwrap();

        assert_eq!(output.embeddings.len(), 2);
        assert_eq!(output.embeddings[0], vec![0.0, 0.0]);
        assert_eq!(output.embeddings[1], vec![1.0, 1.0]);
        assert_eq!(output.dimensions, 2);
    }
}
