use log::info;
use serde::Serialize;
use serde_json::Value;

use crate::{
    clock::SharedClock,
    db::{Database, NewTimer, Timer, TimerKind},
};

use super::{
    state::{derive_live_fields, LiveFields, Transition},
    TimerError,
};

/// A stored timer plus the live values computed when the view was built.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimerView {
    #[serde(flatten)]
    pub timer: Timer,
    #[serde(flatten)]
    pub live: LiveFields,
}

/// Raw create request; fields are validated by [`TimerController::create`].
#[derive(Debug, Clone, Default)]
pub struct CreateTimer {
    pub kind: Option<String>,
    pub label: Option<String>,
    pub duration_ms: Option<Value>,
}

/// Accepts non-negative JSON integers (integral floats included) and strings
/// holding one, up to the largest value the store can hold. `null` means "no
/// target".
pub fn parse_duration_ms(value: &Value) -> Result<Option<u64>, TimerError> {
    let invalid = || TimerError::InvalidArgument("invalid duration_ms".into());
    let ms = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => match n.as_i64() {
            Some(ms) => ms,
            None => match n.as_f64() {
                // `i64::MAX as f64` rounds up to 2^63, hence the strict bound.
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f < i64::MAX as f64 => f as i64,
                _ => return Err(invalid()),
            },
        },
        Value::String(s) => s.trim().parse::<i64>().map_err(|_| invalid())?,
        _ => return Err(invalid()),
    };
    u64::try_from(ms).map(Some).map_err(|_| invalid())
}

#[derive(Clone)]
pub struct TimerController {
    db: Database,
    clock: SharedClock,
}

impl TimerController {
    pub fn new(db: Database, clock: SharedClock) -> Self {
        Self { db, clock }
    }

    fn view(&self, timer: Timer) -> TimerView {
        let live = derive_live_fields(&timer, self.clock.now());
        TimerView { timer, live }
    }

    pub async fn create(&self, request: CreateTimer) -> Result<TimerView, TimerError> {
        let duration_ms = match &request.duration_ms {
            Some(value) => parse_duration_ms(value)?,
            None => None,
        };
        let kind = match request.kind.as_deref().map(str::trim) {
            None | Some("") => TimerKind::Pomodoro,
            Some(kind) => TimerKind::normalize(kind),
        };
        let label = request
            .label
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty());

        let timer = self
            .db
            .insert_timer(
                NewTimer {
                    kind,
                    label,
                    duration_ms,
                },
                self.clock.now(),
            )
            .await?;
        info!("Timer {} created ({})", timer.id, timer.kind.as_str());
        Ok(self.view(timer))
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<TimerView>, TimerError> {
        let timers = self.db.list_timers(active_only).await?;
        Ok(timers.into_iter().map(|timer| self.view(timer)).collect())
    }

    pub async fn pause(&self, timer_id: i64) -> Result<TimerView, TimerError> {
        let timer = self.transition(timer_id, Transition::Pause).await?;
        Ok(self.view(timer))
    }

    pub async fn resume(&self, timer_id: i64) -> Result<TimerView, TimerError> {
        let timer = self.transition(timer_id, Transition::Resume).await?;
        Ok(self.view(timer))
    }

    /// Stops the timer; it ends `completed` when the banked time reached the
    /// target, `stopped` otherwise.
    pub async fn stop(&self, timer_id: i64) -> Result<TimerView, TimerError> {
        let timer = self.transition(timer_id, Transition::Stop).await?;
        Ok(self.view(timer))
    }

    async fn transition(&self, timer_id: i64, transition: Transition) -> Result<Timer, TimerError> {
        let timer = self
            .db
            .transition_timer(timer_id, transition, self.clock.now())
            .await?;
        info!(
            "Timer {} {} -> {}",
            timer.id,
            transition.as_str(),
            timer.status
        );
        Ok(timer)
    }
}
