//! File and attachment responses.

use std::{io::ErrorKind, path::Path};

use anyhow::{anyhow, Context};
use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::error::{ApiError, ApiResult};

/// Rejects names that try to climb out of a serving directory.
pub fn reject_traversal(name: &str) -> ApiResult<()> {
    if name.contains("..") || name.starts_with('/') || name.starts_with('\\') {
        return Err(ApiError::invalid("Invalid filename"));
    }
    Ok(())
}

/// Streams a regular file with a content type guessed from its extension.
pub async fn file_response(path: &Path) -> ApiResult<Response> {
    let file = match tokio::fs::File::open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(ApiError::not_found("Not found"))
        }
        Err(err) => {
            return Err(anyhow::Error::new(err)
                .context(format!("failed to open {}", path.display()))
                .into())
        }
    };
    let metadata = file
        .metadata()
        .await
        .with_context(|| format!("failed to stat {}", path.display()))?;
    if !metadata.is_file() {
        return Err(ApiError::not_found("Not found"));
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let body = Body::from_stream(ReaderStream::new(file));
    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_LENGTH, metadata.len().to_string()),
        ],
        body,
    )
        .into_response())
}

/// Renders a header plus rows as CSV text.
pub fn csv_bytes<I, R>(header: &[&str], rows: I) -> anyhow::Result<Vec<u8>>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator,
    R::Item: AsRef<[u8]>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("failed to finish CSV: {}", err.error()))
}

/// In-memory CSV download.
pub fn csv_attachment(download_name: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{download_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
