//! LLM provider factory.
//!
//! This module builds a generation client from the configured provider
//! name, endpoint, credential and timeout.

use crate::client::LlmClient;
use crate::providers::{MockLlmClient, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use company_chat_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama", "mock")
/// * `endpoint` - Optional custom base URL
/// * `api_key` - API key (required for "openai")
/// * `timeout` - Optional overall timeout per request
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// secret is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    match provider_type {
        ProviderType::OpenAI => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI provider requires API key".to_string())
            })?;
            Ok(Arc::new(OpenAiClient::new(api_key, endpoint, timeout)?))
        }
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::new(endpoint, timeout)?)),
        ProviderType::Mock => {
            tracing::warn!("Using mock generation provider; summaries will always be empty");
            Ok(Arc::new(MockLlmClient::replying("")))
        }
    }
}
