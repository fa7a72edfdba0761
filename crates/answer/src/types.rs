//! Request-scoped types flowing through the answer pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user question, trimmed and guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Trim `raw`; `None` when nothing is left.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One matched document fragment returned by the retrieval service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    /// Fragment text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Originating FAQ question
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,

    /// Originating FAQ answer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,

    /// Relevance, higher is better
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl RetrievalHit {
    /// Text shown to the summarizer for this hit.
    ///
    /// The explicit `text` wins; otherwise the question and answer are
    /// joined. Returns an empty string when the hit carries nothing usable.
    pub fn display_text(&self) -> String {
        if let Some(text) = non_blank(self.text.as_deref()) {
            return text.to_string();
        }

        [self.question.as_deref(), self.answer.as_deref()]
            .into_iter()
            .filter_map(non_blank)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// What the pipeline keeps from one retrieval call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalResult {
    /// The retrieval service's own judgment
    pub found: bool,

    /// Reported best score, or the top hit's score, or 0
    pub best_score: f64,

    /// Retrieval's synthesized answer, trimmed (possibly empty)
    pub direct_answer: String,

    /// Up to five hit texts separated by blank lines
    pub context: String,

    /// Number of hits the service returned
    pub hit_count: usize,
}

impl RetrievalResult {
    /// Zero-confidence result used whenever retrieval fails.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Where an accepted answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    /// Retrieval's direct answer, verbatim
    Direct,
    /// Constrained summary of the retrieval context
    Summary,
}

/// Why the pipeline abstained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffReason {
    EmptyQuestion,
    NotFound,
    NoDataAnswer,
    LowConfidence,
    EmptyContext,
    SummaryRejected,
    Internal,
}

impl HandoffReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyQuestion => "empty_question",
            Self::NotFound => "not_found",
            Self::NoDataAnswer => "no_data_answer",
            Self::LowConfidence => "low_confidence",
            Self::EmptyContext => "empty_context",
            Self::SummaryRejected => "summary_rejected",
            Self::Internal => "internal",
        }
    }
}

/// Terminal state of the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRoute {
    Answered(AnswerSource),
    HandedOff(HandoffReason),
}

impl DecisionRoute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Answered(AnswerSource::Direct) => "direct",
            Self::Answered(AnswerSource::Summary) => "summary",
            Self::HandedOff(reason) => reason.as_str(),
        }
    }
}

/// The reply shown to the user plus how it was reached.
///
/// `needs_handoff` is derived from the route, so it is true exactly when
/// no trustworthy answer was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub reply: String,
    pub route: DecisionRoute,
}

impl Decision {
    pub fn answered(reply: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            reply: reply.into(),
            route: DecisionRoute::Answered(source),
        }
    }

    pub fn handoff(message: impl Into<String>, reason: HandoffReason) -> Self {
        Self {
            reply: message.into(),
            route: DecisionRoute::HandedOff(reason),
        }
    }

    pub fn needs_handoff(&self) -> bool {
        matches!(self.route, DecisionRoute::HandedOff(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_parse() {
        assert_eq!(Question::parse("  설치비가 있나요? \n").unwrap().as_str(), "설치비가 있나요?");
        assert!(Question::parse("").is_none());
        assert!(Question::parse(" \t\n ").is_none());
    }

    #[test]
    fn test_display_text_prefers_text() {
        let hit = RetrievalHit {
            text: Some("  본문  ".to_string()),
            question: Some("Q".to_string()),
            answer: Some("A".to_string()),
            score: Some(0.9),
        };
        assert_eq!(hit.display_text(), "본문");
    }

    #[test]
    fn test_display_text_falls_back_to_qa() {
        let hit = RetrievalHit {
            text: Some("   ".to_string()),
            question: Some("설치비가 있나요?".to_string()),
            answer: Some("설치비는 없습니다.".to_string()),
            score: None,
        };
        assert_eq!(hit.display_text(), "설치비가 있나요?\n설치비는 없습니다.");

        let answer_only = RetrievalHit {
            answer: Some("답변".to_string()),
            ..Default::default()
        };
        assert_eq!(answer_only.display_text(), "답변");
        assert_eq!(RetrievalHit::default().display_text(), "");
    }

    #[test]
    fn test_decision_handoff_flag_follows_route() {
        let answered = Decision::answered("ok", AnswerSource::Direct);
        assert!(!answered.needs_handoff());
        assert_eq!(answered.route.as_str(), "direct");

        let handed_off = Decision::handoff("call us", HandoffReason::LowConfidence);
        assert!(handed_off.needs_handoff());
        assert_eq!(handed_off.route.as_str(), "low_confidence");
    }
}
