use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reminder {
    pub id: i64,
    pub text: String,
    pub interval_min: i64,
    pub active: bool,
    pub use_tts: bool,
    pub use_notif: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub text: String,
    pub interval_min: i64,
    pub active: bool,
    pub use_tts: bool,
    pub use_notif: bool,
}

/// Fields to change on an existing reminder; `None` leaves a column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderPatch {
    pub text: Option<String>,
    pub interval_min: Option<i64>,
    pub active: Option<bool>,
    pub use_tts: Option<bool>,
    pub use_notif: Option<bool>,
}

impl ReminderPatch {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.interval_min.is_none()
            && self.active.is_none()
            && self.use_tts.is_none()
            && self.use_notif.is_none()
    }
}
