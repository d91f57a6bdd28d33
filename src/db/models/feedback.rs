use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feedback {
    pub id: i64,
    pub mood: Option<i64>,
    pub text: Option<String>,
    pub created_at: DateTime<Utc>,
}
