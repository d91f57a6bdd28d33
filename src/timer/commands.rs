use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::ApiResult,
    server::extract::{ApiPath, JsonBody},
    timer::{CreateTimer, TimerController},
    AppState,
};

fn controller_from_state(state: &AppState) -> TimerController {
    state.timers.clone()
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateTimerBody {
    kind: Option<String>,
    label: Option<String>,
    duration_ms: Option<Value>,
}

pub async fn create_timer(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateTimerBody>,
) -> ApiResult<impl IntoResponse> {
    let controller = controller_from_state(&state);
    let created = controller
        .create(CreateTimer {
            kind: body.kind,
            label: body.label,
            duration_ms: body.duration_ms,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "ok": true, "timer": created }))))
}

pub async fn list_timers(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let timers = controller_from_state(&state).list(false).await?;
    Ok(Json(json!({ "ok": true, "timers": timers })))
}

pub async fn active_timers(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let timers = controller_from_state(&state).list(true).await?;
    Ok(Json(json!({ "ok": true, "timers": timers })))
}

pub async fn pause_timer(
    State(state): State<AppState>,
    ApiPath(timer_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let timer = controller_from_state(&state).pause(timer_id).await?;
    Ok(Json(json!({ "ok": true, "timer": timer })))
}

pub async fn resume_timer(
    State(state): State<AppState>,
    ApiPath(timer_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let timer = controller_from_state(&state).resume(timer_id).await?;
    Ok(Json(json!({ "ok": true, "timer": timer })))
}

pub async fn stop_timer(
    State(state): State<AppState>,
    ApiPath(timer_id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    let timer = controller_from_state(&state).stop(timer_id).await?;
    Ok(Json(json!({ "ok": true, "timer": timer })))
}
