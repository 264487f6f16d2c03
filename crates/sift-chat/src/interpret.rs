//! Reply payload interpretation: display text and follow-up extraction

use serde_json::Value;
use sift_api::ReplyPayload;

/// Shown when a completed reply carries no description of its own
pub const FALLBACK_TEXT: &str = "Let me show you the results...";

/// At most this many follow-up suggestions are rendered
pub const MAX_FOLLOW_UPS: usize = 3;

/// Top-level fields probed for follow-up suggestions, in order.
/// The service has shipped all of these names at different times; the
/// first present, non-empty candidate wins.
const FOLLOW_UP_KEYS: &[&str] = &[
    "suggested_followups",
    "followup_questions",
    "suggested_questions",
];

/// Display text for a completed reply: the first attachment's query
/// description, or a fixed placeholder.
pub fn display_text(reply: &ReplyPayload) -> String {
    reply
        .attachments
        .first()
        .and_then(|a| a.query.as_ref())
        .and_then(|q| q.description.clone())
        .unwrap_or_else(|| FALLBACK_TEXT.to_string())
}

/// Extract follow-up suggestion labels from a resolved reply.
///
/// Probes the top-level fields in `FOLLOW_UP_KEYS` order, then the first
/// attachment's `suggested_followups`. Returns every label of the winning
/// candidate; callers cap the rendered count at `MAX_FOLLOW_UPS`.
pub fn follow_up_questions(reply: &ReplyPayload) -> Vec<String> {
    let top_level = FOLLOW_UP_KEYS.iter().filter_map(|key| reply.extra.get(*key));
    let first_attachment = reply
        .attachments
        .first()
        .and_then(|a| a.extra.get("suggested_followups"));

    for candidate in top_level.chain(first_attachment) {
        if let Some(items) = candidate.as_array() {
            if !items.is_empty() {
                return items.iter().filter_map(suggestion_label).collect();
            }
        }
    }
    Vec::new()
}

/// Label for one suggestion item: a bare string, or the first non-empty of
/// `text`, `question`, `content` on an object.
fn suggestion_label(item: &Value) -> Option<String> {
    match item {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(fields) => ["text", "question", "content"]
            .iter()
            .filter_map(|key| fields.get(*key))
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}
