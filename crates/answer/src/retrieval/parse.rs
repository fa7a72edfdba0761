//! Defensive parsing of retrieval service responses.
//!
//! Expected shape:
//! `{answer?: string, hits?: [{text?, question?, answer?, score?}], bestScore?: number, found?: boolean}`.
//! Anything else falls back to a default instead of failing.

use crate::types::{RetrievalHit, RetrievalResult};
use serde_json::Value;

/// Maximum number of hits concatenated into the context.
pub const MAX_CONTEXT_HITS: usize = 5;

/// Separator placed between hit texts in the context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Build a [`RetrievalResult`] from an arbitrary JSON body.
pub fn parse_response(body: &Value) -> RetrievalResult {
    let hits = parse_hits(body.get("hits"));

    let best_score = body
        .get("bestScore")
        .and_then(Value::as_f64)
        .or_else(|| hits.first().and_then(|hit| hit.score))
        .unwrap_or(0.0);

    let found = body.get("found").and_then(Value::as_bool).unwrap_or(false);

    let direct_answer = body
        .get("answer")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    RetrievalResult {
        found,
        best_score,
        direct_answer,
        context: build_context(&hits),
        hit_count: hits.len(),
    }
}

/// Parse the `hits` array; a missing or non-array field yields no hits.
///
/// Non-object entries are skipped, and fields of the wrong type are
/// treated as absent.
fn parse_hits(value: Option<&Value>) -> Vec<RetrievalHit> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_object)
        .map(|obj| {
            let string_field = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
            RetrievalHit {
                text: string_field("text"),
                question: string_field("question"),
                answer: string_field("answer"),
                score: obj.get("score").and_then(Value::as_f64),
            }
        })
        .collect()
}

/// Join the display text of at most [`MAX_CONTEXT_HITS`] hits.
///
/// Hits are taken in the order the service ranked them; empty texts are
/// dropped after the cut, so fewer than five fragments may remain.
pub fn build_context(hits: &[RetrievalHit]) -> String {
    hits.iter()
        .take(MAX_CONTEXT_HITS)
        .map(RetrievalHit::display_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
