//! Error types for timer operations

use thiserror::Error;

use crate::db::TimerStatus;

#[derive(Debug, Error)]
pub enum TimerError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("timer {0} not found")]
    NotFound(i64),

    #[error("timer {id} is {status}, cannot {action}")]
    InvalidState {
        id: i64,
        status: TimerStatus,
        action: &'static str,
    },

    #[error("timer {0} was modified concurrently")]
    Conflict(i64),

    #[error("timer storage failed")]
    Storage(#[from] anyhow::Error),
}
