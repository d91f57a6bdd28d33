use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UsageStats {
    /// Event count per non-empty type.
    pub totals: BTreeMap<String, u64>,
    pub focus_minutes: i64,
    pub focus_sessions: i64,
    pub pomodoro_count: i64,
    pub stopwatch_count: i64,
    pub reminder_count: i64,
    pub sound_count: i64,
    pub hydration_count: i64,
    pub break_count: i64,
    pub wellness_score: i64,
}

/// Window used by `GET /api/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRange {
    Today,
    LastWeek,
}

impl StatsRange {
    /// `7d` selects the last seven days; anything else means today.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("7d") => StatsRange::LastWeek,
            _ => StatsRange::Today,
        }
    }
}
