//! Usage event log.
//!
//! Every event is stored in the `events` table (the source for stats) and
//! mirrored to an append-only CSV file for easy inspection. The table write
//! is the one that matters; a failed CSV append is reported to the caller but
//! never fails the event.

pub mod commands;

use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use log::warn;

use crate::{
    clock::SharedClock,
    db::{Database, Event},
};

pub const CSV_HEADER: [&str; 4] = ["timestamp", "type", "event", "value"];

/// Outcome of recording one event.
#[derive(Debug, Clone)]
pub struct EventWrite {
    pub event: Event,
    pub csv_error: Option<String>,
}

#[derive(Clone)]
pub struct EventLog {
    db: Database,
    csv_path: Arc<PathBuf>,
    clock: SharedClock,
}

impl EventLog {
    pub fn new(db: Database, csv_path: PathBuf, clock: SharedClock) -> Self {
        Self {
            db,
            csv_path: Arc::new(csv_path),
            clock,
        }
    }

    pub fn csv_path(&self) -> &Path {
        self.csv_path.as_path()
    }

    pub async fn record(&self, event_type: &str, event: &str, value: &str) -> Result<EventWrite> {
        let ts = self.clock.now().to_rfc3339();
        let event_type = if event_type.is_empty() {
            "info"
        } else {
            event_type
        };

        let stored = self
            .db
            .insert_event(ts, event_type.to_string(), event.to_string(), value.to_string())
            .await
            .context("failed to store event")?;

        let csv_path = self.csv_path.clone();
        let row = [
            stored.ts.clone(),
            stored.event_type.clone(),
            stored.event.clone(),
            value.to_string(),
        ];
        let csv_error = match tokio::task::spawn_blocking(move || append_csv_row(&csv_path, &row))
            .await
            .map_err(|err| anyhow!("CSV writer task failed: {err}"))
            .and_then(|result| result)
        {
            Ok(()) => None,
            Err(err) => {
                warn!("Failed to mirror event to CSV log: {err:#}");
                Some(format!("{err:#}"))
            }
        };

        Ok(EventWrite {
            event: stored,
            csv_error,
        })
    }
}

/// Creates the CSV log with its header row unless it already exists.
pub fn ensure_csv_log(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(CSV_HEADER)?;
    writer.flush()?;
    Ok(())
}

fn append_csv_row(path: &Path, row: &[String; 4]) -> Result<()> {
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(row)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};

    fn clock() -> SharedClock {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn records_to_table_and_csv() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("logs.csv");
        ensure_csv_log(&csv_path).unwrap();
        let db = Database::open_in_memory().unwrap();
        let log = EventLog::new(db.clone(), csv_path.clone(), clock());

        let write = log.record("timer", "pomodoro_start", "focus, deep").await.unwrap();
        assert!(write.csv_error.is_none());
        assert_eq!(write.event.event_type, "timer");

        let stored = db.list_events().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].value.as_deref(), Some("focus, deep"));

        let mut reader = csv::Reader::from_path(&csv_path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "focus, deep");
    }

    #[tokio::test]
    async fn empty_type_defaults_to_info() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_in_memory().unwrap();
        let log = EventLog::new(db, dir.path().join("logs.csv"), clock());
        let write = log.record("", "ping", "").await.unwrap();
        assert_eq!(write.event.event_type, "info");
    }

    #[tokio::test]
    async fn csv_failure_keeps_database_row() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every append fail.
        let csv_path = dir.path().join("logs.csv");
        std::fs::create_dir(&csv_path).unwrap();
        let db = Database::open_in_memory().unwrap();
        let log = EventLog::new(db.clone(), csv_path, clock());

        let write = log.record("sound", "play", "rain").await.unwrap();
        assert!(write.csv_error.is_some());
        assert_eq!(write.event.event, "play");
        assert_eq!(db.list_events().await.unwrap().len(), 1);
    }

    #[test]
    fn ensure_csv_log_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.csv");
        std::fs::write(&path, "timestamp,type,event,value\nx,y,z,w\n").unwrap();
        ensure_csv_log(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("x,y,z,w"));
    }
}
