//! Mood and free-text feedback from the UI.

use axum::{extract::State, response::Response, Json};
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    server::{
        extract::{text_field, value_as_i64, JsonBody, Payload},
        files::{csv_attachment, csv_bytes},
    },
    AppState,
};

pub const MAX_TEXT_CHARS: usize = 2000;

/// Mood that cannot be read as an integer is stored as null.
pub fn parse_feedback(payload: &Payload) -> ApiResult<(Option<i64>, String)> {
    let mood = payload.get("mood").and_then(value_as_i64);
    let text = text_field(payload, "text")?;
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::invalid("Text too long"));
    }
    Ok((mood, text))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let (mood, text) = parse_feedback(&payload)?;
    state.db.insert_feedback(mood, text, state.clock.now()).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn export_feedback(State(state): State<AppState>) -> ApiResult<Response> {
    let entries = state.db.list_feedback().await?;

    let rows = entries.into_iter().map(|entry| {
        [
            entry.created_at.to_rfc3339(),
            entry.mood.map(|mood| mood.to_string()).unwrap_or_default(),
            entry.text.unwrap_or_default(),
        ]
    });
    let bytes = csv_bytes(&["created_at", "mood", "text"], rows)?;
    Ok(csv_attachment("feedback.csv", bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn mood_is_optional_and_lenient() {
        assert_eq!(
            parse_feedback(&payload(json!({"mood": "4", "text": " ok "}))).unwrap(),
            (Some(4), "ok".to_string())
        );
        assert_eq!(
            parse_feedback(&payload(json!({"mood": "great"}))).unwrap(),
            (None, String::new())
        );
    }

    #[test]
    fn long_text_is_rejected() {
        let text = "x".repeat(MAX_TEXT_CHARS + 1);
        let err = parse_feedback(&payload(json!({ "text": text }))).unwrap_err();
        assert_eq!(err.to_string(), "Text too long");
    }
}
