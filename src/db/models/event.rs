use serde::{Deserialize, Serialize};

/// One row of the usage log. `ts` is kept verbatim so rows with a malformed
/// timestamp can be skipped by the aggregators instead of failing the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: i64,
    pub ts: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub event: String,
    pub value: Option<String>,
}
