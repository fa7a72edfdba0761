//! Mock generation provider.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use company_chat_core::{AppError, AppResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Mock provider for testing and offline runs.
///
/// Returns a fixed reply (or a fixed failure) for every request and records
/// how many times it was called and with what.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    reply: Option<String>,
    calls: AtomicUsize,
    last_request: Mutex<Option<LlmRequest>>,
}

impl MockLlmClient {
    /// A client that answers every request with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            ..Self::default()
        }
    }

    /// A client whose every call fails like an unreachable service.
    pub fn failing() -> Self {
        Self::default()
    }

    /// Number of completed or attempted calls.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The most recent request, if any.
    pub fn last_request(&self) -> Option<LlmRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait::async_trait]
impl LlmClient for MockLlmClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        match &self.reply {
            Some(reply) => Ok(LlmResponse {
                content: reply.clone(),
                model: request.model.clone(),
                usage: LlmUsage::default(),
            }),
            None => Err(AppError::Llm("mock provider has no reply".to_string())),
        }
    }
}
