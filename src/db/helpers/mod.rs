use std::convert::TryFrom;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

pub fn to_i64(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| anyhow!("value {value} exceeds SQLite INTEGER range"))
}

pub fn to_u64(value: i64, field: &str) -> Result<u64> {
    u64::try_from(value).map_err(|_| anyhow!("{field} contains negative value {value}"))
}

/// Canonical on-disk form of every timestamp this crate writes.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Parses RFC 3339, falling back to an offset-less ISO 8601 value read as UTC
/// (rows written by older builds carry no offset).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    parse_timestamp(value)
        .ok_or_else(|| anyhow!("invalid datetime '{value}'"))
        .with_context(|| format!("failed to parse {field}"))
}
