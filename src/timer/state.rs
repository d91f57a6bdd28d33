use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp;

use crate::db::{helpers::parse_timestamp, Timer, TimerStatus};

use super::TimerError;

/// Values derived from a stored timer and the current wall clock. Never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveFields {
    pub live_elapsed_ms: u64,
    /// `None` for stopwatches, serialized as `null`.
    pub live_remaining_ms: Option<u64>,
}

/// Milliseconds since `started_at`, clamped at zero. A missing or unparseable
/// timestamp contributes nothing.
pub fn running_delta_ms(started_at: Option<&str>, now: DateTime<Utc>) -> u64 {
    started_at
        .and_then(parse_timestamp)
        .map(|started| cmp::max((now - started).num_milliseconds(), 0) as u64)
        .unwrap_or(0)
}

pub fn derive_live_fields(timer: &Timer, now: DateTime<Utc>) -> LiveFields {
    let live_elapsed_ms = if timer.status == TimerStatus::Running {
        timer
            .accumulated_ms
            .saturating_add(running_delta_ms(timer.started_at.as_deref(), now))
    } else {
        timer.accumulated_ms
    };

    LiveFields {
        live_elapsed_ms,
        live_remaining_ms: timer
            .duration_ms
            .map(|duration| duration.saturating_sub(live_elapsed_ms)),
    }
}

/// The three mutations a stored timer accepts after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Pause,
    Resume,
    Stop,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Pause => "pause",
            Transition::Resume => "resume",
            Transition::Stop => "stop",
        }
    }

    /// Applies the transition in place. On error the timer is left untouched.
    pub fn apply(self, timer: &mut Timer, now: DateTime<Utc>) -> Result<(), TimerError> {
        let stamp = now.to_rfc3339();
        match (self, timer.status) {
            (Transition::Pause, TimerStatus::Running) => {
                bank_running_interval(timer, now);
                timer.status = TimerStatus::Paused;
                timer.paused_at = Some(stamp.clone());
            }
            (Transition::Resume, TimerStatus::Paused) => {
                timer.status = TimerStatus::Running;
                timer.started_at = Some(stamp.clone());
            }
            (Transition::Stop, TimerStatus::Running | TimerStatus::Paused) => {
                if timer.status == TimerStatus::Running {
                    bank_running_interval(timer, now);
                }
                timer.paused_at = Some(stamp.clone());
                timer.status = match timer.duration_ms {
                    Some(duration) if timer.accumulated_ms >= duration => TimerStatus::Completed,
                    _ => TimerStatus::Stopped,
                };
            }
            (_, status) => {
                return Err(TimerError::InvalidState {
                    id: timer.id,
                    status,
                    action: self.as_str(),
                })
            }
        }
        timer.updated_at = stamp;
        Ok(())
    }
}

// `started_at` stays as-is; it is stale until the next resume.
fn bank_running_interval(timer: &mut Timer, now: DateTime<Utc>) {
    timer.accumulated_ms = timer
        .accumulated_ms
        .saturating_add(running_delta_ms(timer.started_at.as_deref(), now));
}
