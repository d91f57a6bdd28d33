use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::ApiResult,
    server::extract::{value_as_text, JsonBody, Payload},
    AppState,
};

fn field(payload: &Payload, key: &str) -> String {
    payload.get(key).map(value_as_text).unwrap_or_default()
}

/// `POST /api/log`. Any JSON scalar is accepted and stored as text.
pub async fn log_event(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let write = state
        .events
        .record(
            &field(&payload, "type"),
            &field(&payload, "event"),
            &field(&payload, "value"),
        )
        .await?;
    Ok(Json(json!({ "ok": true, "csv_logged": write.csv_error.is_none() })))
}
