//! OpenAI-compatible chat completions provider.
//!
//! Works against api.openai.com and any gateway exposing the same
//! `/v1/chat/completions` contract with bearer authentication.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::providers::{http_client, status_error};
use crate::types::ProviderType;
use company_chat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// Chat completions response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI-compatible client.
pub struct OpenAiClient {
    /// Base URL, without the `/v1/...` suffix
    base_url: String,

    /// Bearer token
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a client for `base_url` (defaults to api.openai.com).
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<&str>,
        timeout: Option<Duration>,
    ) -> AppResult<Self> {
        let base_url = base_url
            .or_else(|| ProviderType::OpenAI.default_endpoint())
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            api_key: api_key.into(),
            client: http_client(timeout)?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Convert LlmRequest to the chat completions format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Convert the first choice into an LlmResponse.
    fn convert_response(&self, response: ChatCompletionResponse) -> AppResult<LlmResponse> {
        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Llm("No choices returned from API".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending chat completion request");

        let body = self.to_chat_request(request);
        let url = self.endpoint();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Llm(format!("Request to {} timed out", url))
                } else {
                    AppError::Llm(format!("Failed to send request to {}: {}", url, e))
                }
            })?;

        if !response.status().is_success() {
            return Err(status_error("OpenAI", response).await);
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat completion: {}", e)))?;

        let converted = self.convert_response(parsed)?;
        tracing::debug!(
            completion_tokens = converted.usage.completion_tokens,
            "Received chat completion"
        );
        Ok(converted)
    }
}
