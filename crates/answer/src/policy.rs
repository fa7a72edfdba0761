//! The answer policy: trust retrieval, escalate to a constrained summary,
//! or hand off to a human.
//!
//! Order of checks for one question:
//! 1. Blank question: hand off without any outbound call.
//! 2. Retrieval (exactly one call, never fails).
//! 3. `found`, a non-empty direct answer that is not a refusal: answer verbatim.
//! 4. Not `found`, a refusal as direct answer, or best score under the
//!    threshold: hand off. Generation never compensates for thin retrieval.
//! 5. Empty context: hand off.
//! 6. Summarize (at most one call); accept a non-empty, non-refusal reply,
//!    otherwise hand off.

use crate::no_data::NoDataDetector;
use crate::retrieval::RetrievalClient;
use crate::summarizer::Summarizer;
use crate::types::{AnswerSource, Decision, HandoffReason, Question, RetrievalResult};
use std::sync::Arc;

/// Request-independent policy state; cheap to share across requests.
pub struct AnswerPolicy {
    retrieval: Arc<dyn RetrievalClient>,
    summarizer: Arc<dyn Summarizer>,
    detector: NoDataDetector,
    threshold: f64,
    handoff_message: String,
}

impl AnswerPolicy {
    pub fn new(
        retrieval: Arc<dyn RetrievalClient>,
        summarizer: Arc<dyn Summarizer>,
        detector: NoDataDetector,
        threshold: f64,
        handoff_message: impl Into<String>,
    ) -> Self {
        Self {
            retrieval,
            summarizer,
            detector,
            threshold,
            handoff_message: handoff_message.into(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn handoff_message(&self) -> &str {
        &self.handoff_message
    }

    /// Decide the reply for one raw question.
    pub async fn decide(&self, raw_question: &str) -> Decision {
        let Some(question) = Question::parse(raw_question) else {
            tracing::info!(route = "empty_question", "Question is blank, handing off");
            return self.handoff(HandoffReason::EmptyQuestion);
        };

        let result = self.retrieval.fetch(&question).await;
        let decision = self.decide_with(&question, &result).await;

        tracing::info!(
            route = decision.route.as_str(),
            found = result.found,
            best_score = result.best_score,
            threshold = self.threshold,
            hits = result.hit_count,
            "Answer decided"
        );

        decision
    }

    async fn decide_with(&self, question: &Question, result: &RetrievalResult) -> Decision {
        let direct_is_refusal = !result.direct_answer.is_empty()
            && self.detector.is_no_data_phrase(&result.direct_answer);

        if result.found && !result.direct_answer.is_empty() && !direct_is_refusal {
            return Decision::answered(result.direct_answer.clone(), AnswerSource::Direct);
        }

        if let Some(reason) = self.abstain_reason(result, direct_is_refusal) {
            return self.handoff(reason);
        }

        if result.context.trim().is_empty() {
            return self.handoff(HandoffReason::EmptyContext);
        }

        let summary = self.summarizer.summarize(question, &result.context).await;
        let summary = summary.trim();

        if summary.is_empty() || self.detector.is_no_data_phrase(summary) {
            tracing::debug!(summary_len = summary.len(), "Summary rejected");
            return self.handoff(HandoffReason::SummaryRejected);
        }

        Decision::answered(summary, AnswerSource::Summary)
    }

    /// Low-confidence short-circuit, authoritative once the direct answer
    /// was not accepted.
    fn abstain_reason(
        &self,
        result: &RetrievalResult,
        direct_is_refusal: bool,
    ) -> Option<HandoffReason> {
        if !result.found {
            Some(HandoffReason::NotFound)
        } else if direct_is_refusal {
            Some(HandoffReason::NoDataAnswer)
        } else if result.best_score.is_nan() || result.best_score < self.threshold {
            Some(HandoffReason::LowConfidence)
        } else {
            None
        }
    }

    fn handoff(&self, reason: HandoffReason) -> Decision {
        Decision::handoff(self.handoff_message.clone(), reason)
    }
}
