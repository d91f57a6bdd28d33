//! Usage statistics computed from the event log.

pub mod commands;
mod types;

pub use types::{StatsRange, UsageStats};

use chrono::{DateTime, Duration, Utc};

use crate::db::{helpers::parse_timestamp, Event};

const SESSION_START_EVENTS: [&str; 3] = ["pomodoro_start", "stopwatch_start", "start"];
const BREAK_WORDS: [&str; 3] = ["break", "stretch", "stand"];

pub fn range_start(range: StatsRange, now: DateTime<Utc>) -> DateTime<Utc> {
    match range {
        StatsRange::Today => start_of_day(now),
        StatsRange::LastWeek => now - Duration::days(7),
    }
}

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or(now)
}

/// Events stamped at or after `since`. Rows whose timestamp does not parse
/// are dropped.
pub fn events_since(events: &[Event], since: DateTime<Utc>) -> impl Iterator<Item = &Event> {
    events
        .iter()
        .filter(move |event| parse_timestamp(&event.ts).is_some_and(|ts| ts >= since))
}

/// Numeric event values are summed truncated toward zero; junk is ignored.
fn numeric_value(value: Option<&str>) -> Option<i64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| v.trunc() as i64)
}

pub fn aggregate<'a>(events: impl IntoIterator<Item = &'a Event>) -> UsageStats {
    let mut stats = UsageStats::default();

    for event in events {
        let event_type = event.event_type.as_str();
        let name = event.event.as_str();
        let value = event.value.as_deref();

        if !event_type.is_empty() {
            *stats.totals.entry(event_type.to_string()).or_insert(0) += 1;
        }

        match name {
            "focus_minutes" => stats.focus_minutes += numeric_value(value).unwrap_or(0),
            "pomodoro_count" => stats.pomodoro_count += numeric_value(value).unwrap_or(0),
            "stopwatch_count" => stats.stopwatch_count += numeric_value(value).unwrap_or(0),
            _ => {}
        }

        match event_type {
            "timer" if SESSION_START_EVENTS.contains(&name) => stats.focus_sessions += 1,
            "reminder" => {
                stats.reminder_count += 1;
                let text = value.unwrap_or_default().to_lowercase();
                if text.contains("hydrat") {
                    stats.hydration_count += 1;
                }
                if BREAK_WORDS.iter().any(|word| text.contains(word)) {
                    stats.break_count += 1;
                }
            }
            "sound" if name == "play" => stats.sound_count += 1,
            _ => {}
        }
    }

    stats.wellness_score = wellness_score(&stats);
    stats
}

/// 0..=100: sessions up to 30, hydration up to 25, breaks up to 25 and
/// 10 points per full 25 focus minutes up to 20.
pub fn wellness_score(stats: &UsageStats) -> i64 {
    let mut score = 0;
    if stats.focus_sessions > 0 {
        score += (stats.focus_sessions * 10).min(30);
    }
    if stats.hydration_count > 0 {
        score += (stats.hydration_count * 5).min(25);
    }
    if stats.break_count > 0 {
        score += (stats.break_count * 5).min(25);
    }
    if stats.focus_minutes >= 25 {
        score += ((stats.focus_minutes / 25) * 10).min(20);
    }
    score.min(100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(ts: &str, event_type: &str, name: &str, value: &str) -> Event {
        Event {
            id: 0,
            ts: ts.to_string(),
            event_type: event_type.to_string(),
            event: name.to_string(),
            value: Some(value.to_string()),
        }
    }

    #[test]
    fn counts_each_category() {
        let ts = "2024-06-01T10:00:00+00:00";
        let events = vec![
            event(ts, "timer", "pomodoro_start", ""),
            event(ts, "timer", "stopwatch_start", ""),
            event(ts, "timer", "pomodoro_complete", "1500000"),
            event(ts, "stats", "focus_minutes", "25.9"),
            event(ts, "stats", "focus_minutes", "oops"),
            event(ts, "stats", "pomodoro_count", "2"),
            event(ts, "reminder", "fired", "Hydrate now"),
            event(ts, "reminder", "fired", "Stand up and stretch"),
            event(ts, "reminder", "fired", "Check posture"),
            event(ts, "sound", "play", "rain"),
            event(ts, "sound", "stop", "rain"),
            event(ts, "", "orphan", ""),
        ];

        let stats = aggregate(&events);
        assert_eq!(stats.focus_sessions, 2);
        assert_eq!(stats.focus_minutes, 25);
        assert_eq!(stats.pomodoro_count, 2);
        assert_eq!(stats.reminder_count, 3);
        assert_eq!(stats.hydration_count, 1);
        assert_eq!(stats.break_count, 1);
        assert_eq!(stats.sound_count, 1);
        assert_eq!(stats.totals.get("timer"), Some(&3));
        assert_eq!(stats.totals.get(""), None);
        // 20 sessions + 5 hydration + 5 breaks + 10 focus
        assert_eq!(stats.wellness_score, 40);
    }

    #[test]
    fn wellness_components_are_capped() {
        let stats = UsageStats {
            focus_sessions: 9,
            hydration_count: 9,
            break_count: 9,
            focus_minutes: 500,
            ..UsageStats::default()
        };
        assert_eq!(wellness_score(&stats), 100);

        let light = UsageStats {
            focus_minutes: 24,
            ..UsageStats::default()
        };
        assert_eq!(wellness_score(&light), 0);
    }

    #[test]
    fn window_filter_skips_old_and_malformed_rows() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 15, 30, 0).unwrap();
        let events = vec![
            event("2024-05-31T23:59:59+00:00", "timer", "start", ""),
            event("2024-06-01T00:00:00+00:00", "timer", "start", ""),
            event("2024-06-01T09:00:00", "timer", "start", ""),
            event("not a time", "timer", "start", ""),
        ];

        let today = aggregate(events_since(&events, range_start(StatsRange::Today, now)));
        assert_eq!(today.focus_sessions, 2);

        let week = aggregate(events_since(&events, range_start(StatsRange::LastWeek, now)));
        assert_eq!(week.focus_sessions, 3);
    }

    #[test]
    fn range_parsing_defaults_to_today() {
        assert_eq!(StatsRange::parse(Some("7d")), StatsRange::LastWeek);
        assert_eq!(StatsRange::parse(Some("30d")), StatsRange::Today);
        assert_eq!(StatsRange::parse(None), StatsRange::Today);
    }
}
