use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    server::extract::{ApiPath, JsonBody, Payload},
    AppState,
};

use super::{parse_new_reminder, parse_reminder_patch};

pub async fn create_reminder(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let reminder = parse_new_reminder(&payload)?;
    let created = state.db.insert_reminder(reminder, state.clock.now()).await?;
    Ok(Json(json!({ "ok": true, "reminder": created })))
}

pub async fn list_reminders(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let reminders = state.db.list_reminders().await?;
    Ok(Json(json!({ "ok": true, "reminders": reminders })))
}

pub async fn update_reminder(
    State(state): State<AppState>,
    ApiPath(reminder_id): ApiPath<i64>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let patch = parse_reminder_patch(&payload)?;
    let reminder = state
        .db
        .update_reminder(reminder_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(json!({ "ok": true, "reminder": reminder })))
}

pub async fn delete_reminder(
    State(state): State<AppState>,
    ApiPath(reminder_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    if !state.db.delete_reminder(reminder_id).await? {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(Json(json!({ "ok": true })))
}
