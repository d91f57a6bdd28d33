use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    server::extract::{ApiPath, JsonBody, Payload},
    AppState,
};

use super::{parse_journal_patch, parse_new_journal};

pub async fn create_journal(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let (title, content) = parse_new_journal(&payload)?;
    let journal = state
        .db
        .insert_journal(title, content, state.clock.now())
        .await?;
    Ok(Json(json!({ "ok": true, "journal": journal })))
}

pub async fn list_journals(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let journals = state.db.list_journals().await?;
    Ok(Json(json!({ "ok": true, "journals": journals })))
}

pub async fn get_journal(
    State(state): State<AppState>,
    ApiPath(journal_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let journal = state
        .db
        .get_journal(journal_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(json!({ "ok": true, "journal": journal })))
}

pub async fn update_journal(
    State(state): State<AppState>,
    ApiPath(journal_id): ApiPath<i64>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let patch = parse_journal_patch(&payload)?;
    let journal = state
        .db
        .update_journal(journal_id, patch, state.clock.now())
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(json!({ "ok": true, "journal": journal })))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    ApiPath(journal_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    if !state.db.delete_journal(journal_id).await? {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(Json(json!({ "ok": true })))
}
