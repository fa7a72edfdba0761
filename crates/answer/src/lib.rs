//! Company question answering.
//!
//! Answers end-user questions about the company by consulting a retrieval
//! service first, escalating to a context-constrained summary only when
//! retrieval is confident but has no clean direct answer, and otherwise
//! handing off to a human with a fixed message.
//!
//! # Example
//! ```no_run
//! use company_chat_answer::CompanyChat;
//! use company_chat_core::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load()?;
//! let chat = CompanyChat::from_config(&config)?;
//! let reply = chat.answer_company_question("설치비가 있나요?").await;
//! println!("{} (handoff: {})", reply.reply, reply.needs_handoff);
//! # Ok(())
//! # }
//! ```

pub mod no_data;
pub mod policy;
pub mod response;
pub mod retrieval;
pub mod summarizer;
pub mod types;

#[cfg(test)]
mod tests;

pub use no_data::NoDataDetector;
pub use policy::AnswerPolicy;
pub use response::{assemble, ChatReply};
pub use retrieval::{HttpRetrievalClient, RetrievalClient, StaticRetrieval};
pub use summarizer::{LlmSummarizer, Summarizer};
pub use types::{
    AnswerSource, Decision, DecisionRoute, HandoffReason, Question, RetrievalHit, RetrievalResult,
};

use company_chat_core::{AppConfig, AppResult};
use company_chat_llm::{create_client, LlmClient};
use company_chat_prompt::{load_prompt, SUMMARIZE_PROMPT_ID};
use std::sync::Arc;

/// Entry point used by the transport shell.
pub struct CompanyChat {
    policy: AnswerPolicy,
}

impl CompanyChat {
    pub fn new(policy: AnswerPolicy) -> Self {
        Self { policy }
    }

    /// Build the pipeline from configuration, creating the generation client.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let llm = create_client(
            &config.provider,
            config.llm_endpoint.as_deref(),
            config.api_key.as_deref(),
            config.request_timeout(),
        )?;
        Self::with_llm(config, llm)
    }

    /// Build the pipeline from configuration around an existing generation client.
    pub fn with_llm(config: &AppConfig, llm: Arc<dyn LlmClient>) -> AppResult<Self> {
        let retrieval = Arc::new(HttpRetrievalClient::new(
            config.retrieval_url.clone(),
            config.request_timeout(),
        )?);

        let prompt = load_prompt(config.prompt_file.as_deref(), SUMMARIZE_PROMPT_ID)?;
        let summarizer = Arc::new(LlmSummarizer::new(llm, config.model.clone(), prompt));

        let detector = NoDataDetector::new(&config.no_data_phrases);
        if detector.is_empty() {
            tracing::warn!("No-data phrase set is empty; refusals will not be detected");
        }

        tracing::info!(
            retrieval_url = %config.retrieval_url,
            threshold = config.confidence_threshold,
            model = %config.model,
            "Answer pipeline ready"
        );

        Ok(Self::new(AnswerPolicy::new(
            retrieval,
            summarizer,
            detector,
            config.confidence_threshold,
            config.handoff_message.clone(),
        )))
    }

    /// `answerCompanyQuestion`: one question in, one reply payload out.
    pub async fn answer_company_question(&self, question: &str) -> ChatReply {
        let decision = self.policy.decide(question).await;
        assemble(&decision)
    }

    /// The fixed handoff payload, for failures outside the policy.
    pub fn handoff_reply(&self) -> ChatReply {
        ChatReply::handoff(self.policy.handoff_message())
    }

    pub fn policy(&self) -> &AnswerPolicy {
        &self.policy
    }
}
