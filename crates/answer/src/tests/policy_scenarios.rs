//! End-to-end policy behavior with deterministic fakes.

use crate::retrieval::parse_response;
use crate::{
    AnswerPolicy, AnswerSource, CompanyChat, DecisionRoute, HandoffReason, LlmSummarizer,
    NoDataDetector, RetrievalResult, StaticRetrieval,
};
use company_chat_core::config::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_HANDOFF_MESSAGE, DEFAULT_NO_DATA_PHRASES, NO_DATA_REPLY,
};
use company_chat_llm::MockLlmClient;
use company_chat_prompt::{builtin_prompt, SUMMARIZE_PROMPT_ID};
use std::sync::Arc;

/// Policy wired to fakes, keeping handles to count outbound calls.
struct Harness {
    retrieval: Arc<StaticRetrieval>,
    llm: Arc<MockLlmClient>,
    chat: CompanyChat,
}

fn harness(result: RetrievalResult, llm: MockLlmClient) -> Harness {
    let retrieval = Arc::new(StaticRetrieval::new(result));
    let llm = Arc::new(llm);
    let summarizer = Arc::new(LlmSummarizer::new(
        llm.clone(),
        "gpt-4o-mini",
        builtin_prompt(SUMMARIZE_PROMPT_ID).unwrap(),
    ));
    let policy = AnswerPolicy::new(
        retrieval.clone(),
        summarizer,
        NoDataDetector::new(DEFAULT_NO_DATA_PHRASES),
        DEFAULT_CONFIDENCE_THRESHOLD,
        DEFAULT_HANDOFF_MESSAGE,
    );
    Harness {
        retrieval,
        llm,
        chat: CompanyChat::new(policy),
    }
}

fn result(found: bool, best_score: f64, direct_answer: &str, context: &str) -> RetrievalResult {
    RetrievalResult {
        found,
        best_score,
        direct_answer: direct_answer.to_string(),
        context: context.to_string(),
        hit_count: usize::from(!context.is_empty()),
    }
}

#[tokio::test]
async fn test_scenario_a_direct_answer_is_returned_verbatim() {
    let h = harness(
        result(true, 0.9, "설치비는 없습니다.", "설치비 무료 안내"),
        MockLlmClient::replying("should not be used"),
    );

    let reply = h.chat.answer_company_question("설치비가 있나요?").await;

    assert_eq!(reply.reply, "설치비는 없습니다.");
    assert!(!reply.needs_handoff);
    assert_eq!(h.retrieval.calls(), 1);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_scenario_b_not_found_hands_off_without_generation() {
    let h = harness(result(false, 0.05, "", ""), MockLlmClient::replying("invented"));

    let reply = h.chat.answer_company_question("오늘 날씨 어때요?").await;

    assert_eq!(reply.reply, DEFAULT_HANDOFF_MESSAGE);
    assert!(reply.needs_handoff);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_scenario_c_summary_from_context() {
    let context = "환불은 7일 이내 가능합니다.";
    let h = harness(
        result(true, 0.5, "", context),
        MockLlmClient::replying("환불은 7일 이내 가능합니다."),
    );

    let reply = h.chat.answer_company_question("환불 정책이 궁금해요").await;

    assert_eq!(reply.reply, "환불은 7일 이내 가능합니다.");
    assert!(!reply.needs_handoff);
    assert_eq!(h.llm.calls(), 1);

    let request = h.llm.last_request().unwrap();
    assert!(request.prompt.contains(context));
    assert!(request.prompt.contains("환불 정책이 궁금해요"));
}

#[tokio::test]
async fn test_scenario_d_summary_refusal_hands_off() {
    let h = harness(
        result(true, 0.5, "", "환불은 7일 이내 가능합니다."),
        MockLlmClient::replying(NO_DATA_REPLY),
    );

    let reply = h.chat.answer_company_question("환불 정책이 궁금해요").await;

    assert_eq!(reply.reply, DEFAULT_HANDOFF_MESSAGE);
    assert!(reply.needs_handoff);
    assert_eq!(h.llm.calls(), 1);
}

#[tokio::test]
async fn test_blank_questions_make_no_outbound_calls() {
    for raw in ["", " ", "\n\t  ", "\u{3000}"] {
        let h = harness(
            result(true, 0.9, "설치비는 없습니다.", "ctx"),
            MockLlmClient::replying("x"),
        );

        let reply = h.chat.answer_company_question(raw).await;

        assert!(reply.needs_handoff);
        assert_eq!(reply.reply, DEFAULT_HANDOFF_MESSAGE);
        assert_eq!(h.retrieval.calls(), 0);
        assert_eq!(h.llm.calls(), 0);
    }
}

#[tokio::test]
async fn test_scores_below_threshold_never_summarize() {
    for score in [0.0, 0.1, 0.34, f64::NAN] {
        let h = harness(
            result(true, score, "", "충분히 긴 관련 자료가 여기에 있습니다."),
            MockLlmClient::replying("요약"),
        );

        let decision = h.chat.policy().decide("질문").await;

        assert_eq!(
            decision.route,
            DecisionRoute::HandedOff(HandoffReason::LowConfidence)
        );
        assert_eq!(h.llm.calls(), 0);
    }
}

#[tokio::test]
async fn test_score_at_threshold_is_accepted() {
    let h = harness(
        result(true, DEFAULT_CONFIDENCE_THRESHOLD, "", "자료"),
        MockLlmClient::replying("요약된 답변"),
    );

    let decision = h.chat.policy().decide("질문").await;
    assert_eq!(decision.route, DecisionRoute::Answered(AnswerSource::Summary));
}

#[tokio::test]
async fn test_direct_answer_wins_even_below_threshold() {
    let h = harness(
        result(true, 0.1, "배송은 2~3일 걸립니다.", ""),
        MockLlmClient::replying("x"),
    );

    let decision = h.chat.policy().decide("배송 기간은?").await;

    assert_eq!(decision.reply, "배송은 2~3일 걸립니다.");
    assert_eq!(decision.route, DecisionRoute::Answered(AnswerSource::Direct));
}

#[tokio::test]
async fn test_direct_answer_ignored_when_not_found() {
    let h = harness(
        result(false, 0.9, "아마 가능합니다.", "자료"),
        MockLlmClient::replying("x"),
    );

    let decision = h.chat.policy().decide("질문").await;

    assert_eq!(decision.route, DecisionRoute::HandedOff(HandoffReason::NotFound));
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_refusal_as_direct_answer_hands_off_without_generation() {
    let h = harness(
        result(true, 0.95, "자료에  없습니다.  고객센터로 문의해 주세요.", "관련 자료"),
        MockLlmClient::replying("요약"),
    );

    let decision = h.chat.policy().decide("질문").await;

    assert_eq!(
        decision.route,
        DecisionRoute::HandedOff(HandoffReason::NoDataAnswer)
    );
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_empty_context_skips_generation() {
    let h = harness(result(true, 0.8, "", "   "), MockLlmClient::replying("요약"));

    let decision = h.chat.policy().decide("질문").await;

    assert_eq!(
        decision.route,
        DecisionRoute::HandedOff(HandoffReason::EmptyContext)
    );
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_generation_failure_hands_off() {
    let h = harness(result(true, 0.8, "", "자료"), MockLlmClient::failing());

    let reply = h.chat.answer_company_question("질문").await;

    assert!(reply.needs_handoff);
    assert_eq!(reply.reply, DEFAULT_HANDOFF_MESSAGE);
    assert_eq!(h.llm.calls(), 1);
}

#[tokio::test]
async fn test_blank_summary_hands_off() {
    let h = harness(result(true, 0.8, "", "자료"), MockLlmClient::replying(" \n "));

    let decision = h.chat.policy().decide("질문").await;

    assert_eq!(
        decision.route,
        DecisionRoute::HandedOff(HandoffReason::SummaryRejected)
    );
}

#[tokio::test]
async fn test_retrieval_outage_hands_off() {
    let h = harness(RetrievalResult::empty(), MockLlmClient::replying("x"));

    let reply = h.chat.answer_company_question("설치비가 있나요?").await;

    assert!(reply.needs_handoff);
    assert_eq!(h.retrieval.calls(), 1);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn test_handoff_flag_matches_route() {
    let cases = [
        result(true, 0.9, "답", ""),
        result(false, 0.0, "", ""),
        result(true, 0.5, "", "자료"),
        result(true, 0.2, "", "자료"),
    ];

    for case in cases {
        let h = harness(case, MockLlmClient::replying("요약"));
        let decision = h.chat.policy().decide("질문").await;
        let answered = matches!(decision.route, DecisionRoute::Answered(_));
        assert_eq!(decision.needs_handoff(), !answered);
        assert_eq!(decision.needs_handoff(), decision.reply == DEFAULT_HANDOFF_MESSAGE);
    }
}

#[tokio::test]
async fn test_wire_score_just_below_threshold_hands_off() {
    let body = serde_json::json!({
        "found": true,
        "bestScore": 0.34999999,
        "hits": [{"text": "자료"}]
    });
    let parsed = parse_response(&body);
    assert!(parsed.best_score < DEFAULT_CONFIDENCE_THRESHOLD);

    let h = harness(parsed, MockLlmClient::replying("요약"));
    let decision = h.chat.policy().decide("질문").await;

    assert_eq!(
        decision.route,
        DecisionRoute::HandedOff(HandoffReason::LowConfidence)
    );
    assert_eq!(h.llm.calls(), 0);
}
