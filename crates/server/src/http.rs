//! HTTP transport.
//!
//! Thin shell around the answer pipeline: framing, CORS and the body limit
//! live here, every decision lives in `company_chat_answer`.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use company_chat_answer::{CompanyChat, HandoffReason};
use company_chat_core::AppResult;
use company_chat_llm::{LlmClient, LlmRequest};
use company_chat_prompt::{build_prompt, PromptDefinition};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Maximum accepted request body.
pub const BODY_LIMIT_BYTES: usize = 64 * 1024;

/// Accepted question fields, in priority order.
pub const QUESTION_FIELDS: &[&str] = &["question", "q", "message", "text", "prompt"];

const OPEN_CHAT_ERROR: &str = "GPT 서버 오류 발생";

/// Application state shared across handlers
pub struct AppState {
    pub chat: Arc<CompanyChat>,
    /// Generation client for the open chat endpoint
    pub llm: Arc<dyn LlmClient>,
    pub open_chat: PromptDefinition,
    pub model: String,
}

type AppStateArc = Arc<AppState>;

pub fn router(state: AppStateArc, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(open_chat))
        .route("/company-chat", post(company_chat))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// First non-blank string among the accepted question fields.
///
/// Bodies that are not a JSON object yield an empty question.
pub fn extract_question(body: &[u8]) -> String {
    field_text(body, QUESTION_FIELDS)
}

fn field_text(body: &[u8], fields: &[&str]) -> String {
    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(body) else {
        return String::new();
    };

    fields
        .iter()
        .filter_map(|field| map.get(*field).and_then(Value::as_str))
        .find(|text| !text.trim().is_empty())
        .unwrap_or_default()
        .to_string()
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true, "ts": chrono::Utc::now().timestamp_millis() }))
}

async fn company_chat(State(state): State<AppStateArc>, body: Bytes) -> Response {
    let question = extract_question(&body);
    let chat = state.chat.clone();

    // A panic inside the pipeline must still produce the handoff payload
    let task = tokio::spawn(async move { chat.answer_company_question(&question).await });

    match task.await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            tracing::error!(
                route = HandoffReason::Internal.as_str(),
                "Answer pipeline failed: {}",
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(state.chat.handoff_reply()),
            )
                .into_response()
        }
    }
}

async fn open_chat(State(state): State<AppStateArc>, body: Bytes) -> Response {
    let message = field_text(&body, &["message"]);

    match complete_open_chat(&state, message).await {
        Ok(reply) => Json(json!({ "reply": reply })).into_response(),
        Err(e) => {
            tracing::error!("Open chat generation failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": OPEN_CHAT_ERROR })),
            )
                .into_response()
        }
    }
}

async fn complete_open_chat(state: &AppState, message: String) -> AppResult<String> {
    let mut variables = HashMap::new();
    variables.insert("message".to_string(), message);
    let built = build_prompt(&state.open_chat, variables)?;

    let request = LlmRequest::new(built.user, state.model.clone())
        .with_system(built.system)
        .with_temperature(state.open_chat.temperature);

    let response = state.llm.complete(&request).await?;
    Ok(response.content)
}
