//! Persistent timer records.
//!
//! A timer never ticks in memory: `accumulated_ms` banks every finished
//! running interval and the live values are derived on read (see
//! `crate::timer::state`).

use std::fmt;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Pomodoro,
    Stopwatch,
    Custom,
}

impl TimerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerKind::Pomodoro => "pomodoro",
            TimerKind::Stopwatch => "stopwatch",
            TimerKind::Custom => "custom",
        }
    }

    /// Unrecognized kinds collapse to `Custom`.
    pub fn normalize(value: &str) -> Self {
        match value.trim() {
            "pomodoro" => TimerKind::Pomodoro,
            "stopwatch" => TimerKind::Stopwatch,
            _ => TimerKind::Custom,
        }
    }
}

impl Default for TimerKind {
    fn default() -> Self {
        TimerKind::Pomodoro
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Paused,
    Stopped,
    Completed,
}

impl TimerStatus {
    pub const ALL: [TimerStatus; 4] = [
        TimerStatus::Running,
        TimerStatus::Paused,
        TimerStatus::Stopped,
        TimerStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Stopped => "stopped",
            TimerStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "running" => Ok(TimerStatus::Running),
            "paused" => Ok(TimerStatus::Paused),
            "stopped" => Ok(TimerStatus::Stopped),
            "completed" => Ok(TimerStatus::Completed),
            other => Err(anyhow!("unknown timer status {other}")),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, TimerStatus::Running | TimerStatus::Paused)
    }
}

impl fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `timers` table.
///
/// Timestamps are kept as the stored strings: a malformed `started_at` must
/// degrade to zero live elapsed time instead of failing the whole row, and
/// `updated_at` doubles as the compare-and-swap token for transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timer {
    pub id: i64,
    pub kind: TimerKind,
    pub label: Option<String>,
    pub duration_ms: Option<u64>,
    pub status: TimerStatus,
    pub started_at: Option<String>,
    pub paused_at: Option<String>,
    pub accumulated_ms: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Validated input for inserting a new timer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimer {
    pub kind: TimerKind,
    pub label: Option<String>,
    pub duration_ms: Option<u64>,
}
