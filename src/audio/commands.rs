use anyhow::Context;
use axum::{
    extract::{multipart::Field, Multipart, State},
    response::Response,
    Json,
};
use log::{info, warn};
use serde_json::{json, Value};
use tokio::{fs, io::AsyncWriteExt};

use crate::{
    error::{ApiError, ApiResult},
    server::{
        extract::ApiPath,
        files::{file_response, reject_traversal},
    },
    AppState,
};

use super::{is_allowed_mime, list_sounds, stored_upload_name, MAX_UPLOAD_BYTES};

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::invalid(err.body_text())
}

/// Streams the field to `dest`, giving up once it exceeds the size cap.
/// Returns the byte count, or `None` when the file was too large. The caller
/// owns cleanup of `dest` on every non-success exit.
async fn save_field(field: &mut Field<'_>, dest: &std::path::Path) -> ApiResult<Option<u64>> {
    let mut file = fs::File::create(dest)
        .await
        .with_context(|| format!("failed to create {}", dest.display()))?;
    let mut size: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len() as u64;
        if size > MAX_UPLOAD_BYTES {
            return Ok(None);
        }
        file.write_all(&chunk)
            .await
            .with_context(|| format!("failed to write {}", dest.display()))?;
    }
    file.flush().await.context("failed to flush upload")?;
    Ok(Some(size))
}

async fn discard_partial(dest: &std::path::Path) {
    match fs::remove_file(dest).await {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => warn!("Failed to remove partial upload {}: {err}", dest.display()),
    }
}

/// `POST /api/upload` with the file in the `audio` field.
pub async fn upload_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("audio") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        if original_name.is_empty() {
            return Err(ApiError::invalid("No filename"));
        }
        let mime = field.content_type().unwrap_or_default().to_string();
        if !is_allowed_mime(&mime) {
            return Err(ApiError::invalid("Unsupported type"));
        }

        let now = state.clock.now();
        let filename = stored_upload_name(&original_name, now, rand::random::<u32>());
        let dest = state.paths.uploads.join(&filename);
        let stored = async {
            let Some(size) = save_field(&mut field, &dest).await? else {
                return Err(ApiError::invalid("File too large"));
            };
            state
                .db
                .insert_upload(
                    filename.clone(),
                    original_name,
                    mime,
                    i64::try_from(size).context("upload size overflow")?,
                    now,
                )
                .await?;
            Ok::<u64, ApiError>(size)
        }
        .await;
        let size = match stored {
            Ok(size) => size,
            Err(err) => {
                discard_partial(&dest).await;
                return Err(err);
            }
        };
        info!("Stored upload {filename} ({size} bytes)");

        return Ok(Json(json!({
            "ok": true,
            "id": filename,
            "url": format!("/uploads/{filename}"),
        })));
    }

    Err(ApiError::invalid("No file"))
}

pub async fn serve_upload(
    State(state): State<AppState>,
    ApiPath(filename): ApiPath<String>,
) -> ApiResult<Response> {
    reject_traversal(&filename)?;
    file_response(&state.paths.uploads.join(filename)).await
}

pub async fn ambient_sounds(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let sounds_dir = state.paths.sounds.clone();
    let sounds = match tokio::task::spawn_blocking(move || list_sounds(&sounds_dir)).await {
        Ok(Ok(sounds)) => sounds,
        Ok(Err(err)) => {
            warn!("Failed to list ambient sounds: {err:#}");
            Vec::new()
        }
        Err(err) => return Err(anyhow::anyhow!("sound listing task failed: {err}").into()),
    };
    Ok(Json(json!({ "ok": true, "sounds": sounds })))
}

pub async fn serve_ambient(
    State(state): State<AppState>,
    ApiPath(filename): ApiPath<String>,
) -> ApiResult<Response> {
    reject_traversal(&filename)?;
    file_response(&state.paths.sounds.join(filename)).await
}
