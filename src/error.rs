//! Errors surfaced to HTTP clients.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde_json::json;
use thiserror::Error;

use crate::timer::TimerError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Timeout(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidArgument(_) | ApiError::InvalidState(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TimerError> for ApiError {
    fn from(err: TimerError) -> Self {
        match err {
            TimerError::InvalidArgument(message) => ApiError::InvalidArgument(message),
            TimerError::NotFound(_) => ApiError::NotFound(err.to_string()),
            TimerError::InvalidState { .. } | TimerError::Conflict(_) => {
                ApiError::InvalidState(err.to_string())
            }
            TimerError::Storage(source) => ApiError::Internal(source),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(source) => {
                error!("Request failed: {source:#}");
                format!("{source:#}")
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "ok": false, "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TimerStatus;

    #[test]
    fn timer_errors_map_to_http_taxonomy() {
        let cases = [
            (TimerError::InvalidArgument("bad".into()), StatusCode::BAD_REQUEST),
            (TimerError::NotFound(3), StatusCode::NOT_FOUND),
            (
                TimerError::InvalidState {
                    id: 3,
                    status: TimerStatus::Paused,
                    action: "pause",
                },
                StatusCode::BAD_REQUEST,
            ),
            (TimerError::Conflict(3), StatusCode::BAD_REQUEST),
            (
                TimerError::Storage(anyhow::anyhow!("disk")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[tokio::test]
    async fn error_body_is_ok_false_with_message() {
        let response = ApiError::not_found("Not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["ok"], false);
        assert_eq!(body["error"], "Not found");
    }
}
