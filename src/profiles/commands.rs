use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::{
    db::ProfileDeletion,
    error::{ApiError, ApiResult},
    server::extract::{ApiPath, JsonBody, Payload},
    AppState,
};

use super::{parse_new_profile, parse_profile_patch};

pub async fn create_profile(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let profile = parse_new_profile(&payload)?;
    let created = state.db.insert_profile(profile, state.clock.now()).await?;
    Ok(Json(json!({ "ok": true, "profile": created })))
}

pub async fn list_profiles(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let profiles = state.db.list_profiles().await?;
    Ok(Json(json!({ "ok": true, "profiles": profiles })))
}

pub async fn active_profile(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let profile = state
        .db
        .active_profile()
        .await?
        .ok_or_else(|| ApiError::not_found("No active profile"))?;
    Ok(Json(json!({ "ok": true, "profile": profile })))
}

pub async fn activate_profile(
    State(state): State<AppState>,
    ApiPath(profile_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let profile = state
        .db
        .activate_profile(profile_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(json!({ "ok": true, "profile": profile })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    ApiPath(profile_id): ApiPath<i64>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let patch = parse_profile_patch(&payload)?;
    let profile = state
        .db
        .update_profile(profile_id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Not found"))?;
    Ok(Json(json!({ "ok": true, "profile": profile })))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    ApiPath(profile_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    match state.db.delete_profile(profile_id).await? {
        ProfileDeletion::Deleted => Ok(Json(json!({ "ok": true }))),
        ProfileDeletion::NotFound => Err(ApiError::not_found("Not found")),
        ProfileDeletion::LastProfile => Err(ApiError::invalid("Cannot delete last profile")),
        ProfileDeletion::ActiveProfile => Err(ApiError::invalid("Cannot delete active profile")),
    }
}
