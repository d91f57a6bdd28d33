use std::fs;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    error::{ApiError, ApiResult},
    server::extract::{text_field, JsonBody, Payload},
    AppState,
};

use super::paths::resolve_within;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LsQuery {
    path: Option<String>,
}

pub async fn make_dir(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<Payload>,
) -> ApiResult<Json<Value>> {
    let relative = text_field(&payload, "path")?;
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() {
        return Err(ApiError::invalid("path required"));
    }
    let target = resolve_within(&state.paths.root, relative)
        .ok_or_else(|| ApiError::invalid("invalid path"))?;

    tokio::fs::create_dir_all(&target)
        .await
        .with_context(|| format!("failed to create {}", target.display()))?;
    Ok(Json(json!({ "ok": true, "path": target.display().to_string() })))
}

pub async fn list_dir(
    State(state): State<AppState>,
    Query(query): Query<LsQuery>,
) -> ApiResult<Json<Value>> {
    let relative = query
        .path
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .unwrap_or_else(|| ".".to_string());
    let target = resolve_within(&state.paths.root, &relative)
        .ok_or_else(|| ApiError::invalid("invalid path"))?;

    let entries = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(&target)
            .with_context(|| format!("failed to read {}", target.display()))?
        {
            let entry = entry?;
            let metadata = entry.metadata()?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: metadata.is_dir(),
                size: metadata.is_file().then(|| metadata.len()),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    })
    .await
    .context("directory listing task failed")??;

    Ok(Json(json!({ "ok": true, "entries": entries })))
}
