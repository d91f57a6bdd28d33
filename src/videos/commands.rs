use anyhow::{anyhow, Context};
use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    server::{
        extract::{text_field, value_as_flag, value_as_text, ApiPath, JsonBody, Payload},
        files::file_response,
    },
    utils::paths::{normalize_relative, resolve_within},
    AppState,
};

use super::{
    format_for_quality, parse_search_output, playlist_title, sanitize_playlist_name, scan_library,
    ytdlp::{self, ToolError, ToolOutput, DOWNLOAD_TIMEOUT, SEARCH_TIMEOUT},
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

fn tool_error(err: ToolError, timeout_message: &str) -> ApiError {
    match err {
        ToolError::Timeout { .. } => {
            warn!("{err}");
            ApiError::Timeout(timeout_message.to_string())
        }
        other => ApiError::Internal(other.into()),
    }
}

fn require_success(output: ToolOutput, what: &str) -> ApiResult<ToolOutput> {
    if output.success {
        Ok(output)
    } else {
        Err(anyhow!("{what} failed: {}", output.stderr.trim()).into())
    }
}

fn flag(payload: &Payload, key: &str) -> bool {
    payload.get(key).map(value_as_flag).unwrap_or(false)
}

pub async fn search_videos(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Value>> {
    let query = query.query.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Err(ApiError::invalid("query required"));
    }

    let output = state
        .ytdlp
        .run(&ytdlp::search_args(&query), SEARCH_TIMEOUT)
        .await
        .map_err(|err| tool_error(err, "Search timeout"))?;
    let output = require_success(output, "Search")?;
    let results = parse_search_output(&output.stdout);
    Ok(Json(json!({ "ok": true, "results": results })))
}

pub async fn download_video(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let url = text_field(&payload, "url")?;
    if url.is_empty() {
        return Err(ApiError::invalid("url required"));
    }
    let is_playlist = flag(&payload, "is_playlist");
    let quality = payload
        .get("quality")
        .map(value_as_text)
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| "best".to_string());
    let format = format_for_quality(&quality)
        .ok_or_else(|| ApiError::invalid(format!("Invalid quality: {quality}")))?;

    let mut target_dir = state.paths.videos.clone();
    if is_playlist {
        let info = state
            .ytdlp
            .run(&ytdlp::playlist_info_args(&url), SEARCH_TIMEOUT)
            .await
            .map_err(|err| tool_error(err, "Playlist lookup timeout"))?;
        let info = require_success(info, "Playlist lookup")?;
        target_dir = target_dir.join(sanitize_playlist_name(&playlist_title(&info.stdout)));
        tokio::fs::create_dir_all(&target_dir)
            .await
            .with_context(|| format!("failed to create {}", target_dir.display()))?;
    }

    let template = target_dir.join("%(title)s.%(ext)s");
    let output = state
        .ytdlp
        .run(
            &ytdlp::download_args(&format, &template.to_string_lossy(), &url),
            DOWNLOAD_TIMEOUT,
        )
        .await
        .map_err(|err| tool_error(err, "Download timeout"))?;
    require_success(output, "Download")?;
    info!("Downloaded {url} into {}", target_dir.display());

    Ok(Json(json!({
        "ok": true,
        "message": "Download complete",
        "is_playlist": is_playlist,
        "location": target_dir.display().to_string(),
    })))
}

pub async fn video_library(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let watched = state.db.watched_map().await?;
    let videos_dir = state.paths.videos.clone();
    let library = tokio::task::spawn_blocking(move || scan_library(&videos_dir, &watched))
        .await
        .context("library scan task failed")??;
    Ok(Json(json!({ "ok": true, "library": library })))
}

pub async fn toggle_watched(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let path = text_field(&payload, "path")?;
    if path.is_empty() {
        return Err(ApiError::invalid("path required"));
    }
    let watched = state.db.toggle_watched(path, state.clock.now()).await?;
    Ok(Json(json!({ "ok": true, "watched": watched })))
}

pub async fn delete_video(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let relative = text_field(&payload, "path")?;
    if relative.is_empty() {
        return Err(ApiError::invalid("path required"));
    }
    // The videos directory itself is never a deletion target.
    let stays_below_root = normalize_relative(std::path::Path::new(
        relative.trim_start_matches(|c: char| c == '/' || c == '\\'),
    ))
    .is_some_and(|p| p.components().next().is_some());
    let target = resolve_within(&state.paths.videos, &relative)
        .filter(|_| stays_below_root)
        .ok_or_else(|| ApiError::invalid("Invalid path"))?;

    if flag(&payload, "is_playlist") {
        if !tokio::fs::metadata(&target).await.is_ok_and(|m| m.is_dir()) {
            return Err(ApiError::not_found("Playlist not found"));
        }
        tokio::fs::remove_dir_all(&target)
            .await
            .with_context(|| format!("failed to delete {}", target.display()))?;
        info!("Deleted playlist {}", target.display());
        return Ok(Json(json!({ "ok": true, "message": "Playlist deleted" })));
    }

    if !tokio::fs::metadata(&target).await.is_ok_and(|m| m.is_file()) {
        return Err(ApiError::not_found("Video not found"));
    }
    tokio::fs::remove_file(&target)
        .await
        .with_context(|| format!("failed to delete {}", target.display()))?;
    info!("Deleted video {}", target.display());
    Ok(Json(json!({ "ok": true, "message": "Video deleted" })))
}

pub async fn serve_video(
    State(state): State<AppState>,
    ApiPath(filename): ApiPath<String>,
) -> ApiResult<Response> {
    let target = resolve_within(&state.paths.videos, &filename)
        .ok_or_else(|| ApiError::Forbidden("Forbidden".to_string()))?;
    file_response(&target).await
}
