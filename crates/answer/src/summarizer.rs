//! Constrained summarization of retrieval context.
//!
//! The model is told to answer only from the supplied context and to emit a
//! fixed refusal sentence otherwise. Whether the reply is acceptable is the
//! policy's decision, not this module's.

use crate::types::Question;
use company_chat_core::config::NO_DATA_REPLY;
use company_chat_core::AppResult;
use company_chat_llm::{LlmClient, LlmRequest};
use company_chat_prompt::{build_prompt, PromptDefinition, MAX_SUMMARIZE_TEMPERATURE};
use std::collections::HashMap;
use std::sync::Arc;

/// Capability to turn (question, context) into a short reply.
///
/// `summarize` never fails; an unusable generation call yields `""`.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, question: &Question, context: &str) -> String;
}

/// Summarizer backed by a generation provider.
pub struct LlmSummarizer {
    client: Arc<dyn LlmClient>,
    model: String,
    prompt: PromptDefinition,
    no_data_reply: String,
}

impl LlmSummarizer {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, prompt: PromptDefinition) -> Self {
        Self {
            client,
            model: model.into(),
            prompt,
            no_data_reply: NO_DATA_REPLY.to_string(),
        }
    }

    /// Replace the refusal sentence the model is told to use.
    pub fn with_no_data_reply(mut self, reply: impl Into<String>) -> Self {
        self.no_data_reply = reply.into();
        self
    }

    /// Render the system/user pair for one call.
    pub fn build_request(&self, question: &Question, context: &str) -> AppResult<LlmRequest> {
        let mut variables = HashMap::new();
        variables.insert("question".to_string(), question.as_str().to_string());
        variables.insert("context".to_string(), context.to_string());
        variables.insert("noDataReply".to_string(), self.no_data_reply.clone());

        let built = build_prompt(&self.prompt, variables)?;

        let mut request = LlmRequest::new(built.user, self.model.clone())
            .with_system(built.system)
            .with_temperature(self.prompt.temperature.min(MAX_SUMMARIZE_TEMPERATURE));
        if let Some(max_tokens) = self.prompt.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        Ok(request)
    }

    async fn try_summarize(&self, question: &Question, context: &str) -> AppResult<String> {
        let request = self.build_request(question, context)?;
        let response = self.client.complete(&request).await?;
        Ok(response.content.trim().to_string())
    }
}

#[async_trait::async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, question: &Question, context: &str) -> String {
        match self.try_summarize(question, context).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(
                    provider = self.client.provider_name(),
                    error = %e,
                    "Generation unavailable, treating summary as empty"
                );
                String::new()
            }
        }
    }
}
