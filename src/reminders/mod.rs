//! Recurring reminders (hydration, breaks, posture...).

pub mod commands;

use serde_json::Value;

use crate::{
    db::{NewReminder, ReminderPatch},
    error::{ApiError, ApiResult},
    server::extract::{value_as_flag, value_as_i64, Payload},
};

pub const MAX_TEXT_CHARS: usize = 120;
pub const MIN_INTERVAL_MIN: i64 = 1;
pub const MAX_INTERVAL_MIN: i64 = 24 * 60;
const DEFAULT_INTERVAL_MIN: i64 = 30;

fn reminder_text(value: Option<&Value>) -> ApiResult<String> {
    let text = match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(_) => return Err(ApiError::invalid("Invalid text")),
    };
    if text.is_empty() || text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::invalid("Invalid text"));
    }
    Ok(text)
}

fn check_interval(interval_min: i64) -> ApiResult<i64> {
    if (MIN_INTERVAL_MIN..=MAX_INTERVAL_MIN).contains(&interval_min) {
        Ok(interval_min)
    } else {
        Err(ApiError::invalid("Invalid interval"))
    }
}

fn flag_or(payload: &Payload, key: &str, default: bool) -> bool {
    payload.get(key).map(value_as_flag).unwrap_or(default)
}

/// Builds a reminder from a create request. An interval that cannot be read
/// as an integer falls back to 30 minutes.
pub fn parse_new_reminder(payload: &Payload) -> ApiResult<NewReminder> {
    let text = reminder_text(payload.get("text"))?;
    let interval_min = payload
        .get("interval_min")
        .and_then(value_as_i64)
        .unwrap_or(DEFAULT_INTERVAL_MIN);

    Ok(NewReminder {
        text,
        interval_min: check_interval(interval_min)?,
        active: flag_or(payload, "active", true),
        use_tts: flag_or(payload, "use_tts", true),
        use_notif: flag_or(payload, "use_notif", false),
    })
}

/// Every key present in the body becomes part of the patch; the whole patch
/// is validated before anything is written.
pub fn parse_reminder_patch(payload: &Payload) -> ApiResult<ReminderPatch> {
    let mut patch = ReminderPatch::default();

    if payload.contains_key("text") {
        patch.text = Some(reminder_text(payload.get("text"))?);
    }
    if let Some(value) = payload.get("interval_min") {
        let interval_min =
            value_as_i64(value).ok_or_else(|| ApiError::invalid("Invalid interval"))?;
        patch.interval_min = Some(check_interval(interval_min)?);
    }
    patch.active = payload.get("active").map(value_as_flag);
    patch.use_tts = payload.get("use_tts").map(value_as_flag);
    patch.use_notif = payload.get("use_notif").map(value_as_flag);

    if patch.is_empty() {
        return Err(ApiError::invalid("No fields"));
    }
    Ok(patch)
}
