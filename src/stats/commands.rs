use anyhow::Context;
use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use chrono::Duration;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{ApiError, ApiResult},
    events::CSV_HEADER,
    server::files::{csv_attachment, csv_bytes},
    AppState,
};

use super::{aggregate, events_since, range_start, start_of_day, StatsRange};

const SUMMARY_HEADER: [&str; 10] = [
    "Date",
    "Pomodoros",
    "Stopwatch Sessions",
    "Total Focus Sessions",
    "Focus Minutes",
    "Reminders",
    "Sounds",
    "Hydration",
    "Breaks",
    "Wellness Score",
];

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    range: Option<String>,
}

pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<Value>> {
    let since = range_start(StatsRange::parse(query.range.as_deref()), state.clock.now());
    let events = state.db.list_events().await?;
    let stats = aggregate(events_since(&events, since));

    let mut body = serde_json::to_value(&stats).context("failed to encode stats")?;
    body["ok"] = Value::Bool(true);
    Ok(Json(body))
}

/// The raw CSV log as written by the event log.
pub async fn export_log(State(state): State<AppState>) -> ApiResult<Response> {
    let path = state.events.csv_path().to_path_buf();
    let bytes = tokio::fs::read(&path).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            ApiError::not_found("Not found")
        } else {
            ApiError::Internal(
                anyhow::Error::new(err).context(format!("failed to read {}", path.display())),
            )
        }
    })?;
    Ok(csv_attachment("ambient_logs.csv", bytes))
}

pub async fn export_daily(State(state): State<AppState>) -> ApiResult<Response> {
    let cutoff = state.clock.now() - Duration::hours(24);
    let events = state.db.list_events().await?;
    let rows = events_since(&events, cutoff).map(|event| {
        [
            event.ts.clone(),
            event.event_type.clone(),
            event.event.clone(),
            event.value.clone().unwrap_or_default(),
        ]
    });
    let bytes = csv_bytes(&CSV_HEADER, rows)?;
    Ok(csv_attachment("daily_events.csv", bytes))
}

pub async fn export_summary(State(state): State<AppState>) -> ApiResult<Response> {
    let now = state.clock.now();
    let events = state.db.list_events().await?;
    let stats = aggregate(events_since(&events, start_of_day(now)));

    let row = [
        now.format("%Y-%m-%d").to_string(),
        stats.pomodoro_count.to_string(),
        stats.stopwatch_count.to_string(),
        stats.focus_sessions.to_string(),
        stats.focus_minutes.to_string(),
        stats.reminder_count.to_string(),
        stats.sound_count.to_string(),
        stats.hydration_count.to_string(),
        stats.break_count.to_string(),
        stats.wellness_score.to_string(),
    ];
    let bytes = csv_bytes(&SUMMARY_HEADER, [row])?;
    Ok(csv_attachment("daily_summary.csv", bytes))
}
