//! Generation client crate for the company chat service.
//!
//! This crate provides a provider-agnostic abstraction over chat-style
//! completion APIs. The answer pipeline only ever sees [`LlmClient`].
//!
//! # Providers
//! - **OpenAI**: any OpenAI-compatible `/v1/chat/completions` endpoint (default)
//! - **Ollama**: local runtime via `/api/chat`
//! - **Mock**: canned replies with call counting, for tests and offline runs
//!
//! # Example
//! ```no_run
//! use company_chat_llm::{LlmClient, LlmRequest, providers::OpenAiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OpenAiClient::new("sk-...", None, None)?;
//! let request = LlmRequest::new("설치비가 있나요?", "gpt-4o-mini")
//!     .with_system("You are a helpful assistant.")
//!     .with_temperature(0.0);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{MockLlmClient, OllamaClient, OpenAiClient};
pub use types::ProviderType;
