use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping row for a stored audio upload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Upload {
    pub id: i64,
    pub filename: String,
    pub original_name: Option<String>,
    pub mime: Option<String>,
    pub size: Option<i64>,
    pub created_at: DateTime<Utc>,
}
