//! Retrieval service client.

use crate::retrieval::parse::parse_response;
use crate::types::{Question, RetrievalResult};
use company_chat_core::{AppError, AppResult};
use serde::Serialize;
use std::time::Duration;

/// Capability to consult the retrieval service.
///
/// `fetch` never fails: any transport or parse problem yields
/// [`RetrievalResult::empty`] so the policy can proceed deterministically.
#[async_trait::async_trait]
pub trait RetrievalClient: Send + Sync {
    async fn fetch(&self, question: &Question) -> RetrievalResult;
}

#[derive(Debug, Serialize)]
struct RetrievalRequest<'a> {
    question: &'a str,
}

/// Retrieval over HTTP: `POST {url}` with `{"question": ...}`.
#[derive(Debug, Clone)]
pub struct HttpRetrievalClient {
    url: String,
    client: reqwest::Client,
}

impl HttpRetrievalClient {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Retrieval(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform the call and surface failures as `AppError::Retrieval`.
    pub async fn try_fetch(&self, question: &Question) -> AppResult<RetrievalResult> {
        let response = self
            .client
            .post(&self.url)
            .json(&RetrievalRequest {
                question: question.as_str(),
            })
            .send()
            .await
            .map_err(|e| AppError::Retrieval(format!("Request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Retrieval(format!(
                "Retrieval service returned {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Retrieval(format!("Invalid JSON from retrieval: {}", e)))?;

        Ok(parse_response(&body))
    }
}

#[async_trait::async_trait]
impl RetrievalClient for HttpRetrievalClient {
    async fn fetch(&self, question: &Question) -> RetrievalResult {
        match self.try_fetch(question).await {
            Ok(result) => {
                tracing::debug!(
                    found = result.found,
                    best_score = result.best_score,
                    hits = result.hit_count,
                    "Retrieval completed"
                );
                result
            }
            Err(e) => {
                tracing::warn!(error = %e, "Retrieval unavailable, continuing with empty result");
                RetrievalResult::empty()
            }
        }
    }
}
