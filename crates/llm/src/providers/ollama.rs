//! Ollama chat provider.
//!
//! Talks to a local Ollama runtime through `/api/chat` with streaming off.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::providers::{http_client, status_error};
use crate::types::ProviderType;
use company_chat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama `/api/chat` request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    options: OllamaOptions,
    stream: bool,
}

/// Ollama `/api/chat` response format.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    message: Option<OllamaReply>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaReply {
    #[serde(default)]
    content: String,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for `base_url` (defaults to http://localhost:11434).
    pub fn new(base_url: Option<&str>, timeout: Option<Duration>) -> AppResult<Self> {
        let base_url = base_url
            .or_else(|| ProviderType::Ollama.default_endpoint())
            .unwrap_or_default()
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            base_url,
            client: http_client(timeout)?,
        })
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request(&self, request: &LlmRequest) -> OllamaChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(OllamaMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(OllamaMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        OllamaChatRequest {
            model: request.model.clone(),
            messages,
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream: false,
        }
    }

    /// Convert Ollama response to LlmResponse.
    fn convert_response(&self, response: OllamaChatResponse) -> AppResult<LlmResponse> {
        let content = response
            .message
            .map(|m| m.content)
            .ok_or_else(|| AppError::Llm("Ollama response has no message".to_string()))?;

        Ok(LlmResponse {
            content,
            model: response.model,
            usage: LlmUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        })
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending chat request to Ollama");

        let body = self.to_ollama_request(request);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error("Ollama", response).await);
        }

        let parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        self.convert_response(parsed)
    }
}
