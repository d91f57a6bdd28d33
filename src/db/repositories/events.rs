use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{connection::Database, models::Event};

fn row_to_event(row: &Row) -> Result<Event> {
    Ok(Event {
        id: row.get("id")?,
        ts: row.get("ts")?,
        event_type: row.get("type")?,
        event: row.get("event")?,
        value: row.get("value")?,
    })
}

impl Database {
    pub async fn insert_event(
        &self,
        ts: String,
        event_type: String,
        event: String,
        value: String,
    ) -> Result<Event> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO events (ts, type, event, value) VALUES (?1, ?2, ?3, ?4)",
                params![ts, event_type, event, value],
            )?;
            Ok(Event {
                id: conn.last_insert_rowid(),
                ts,
                event_type,
                event,
                value: Some(value),
            })
        })
        .await
    }

    /// Every event in insertion order. Time filtering happens in the caller
    /// because `ts` values are not guaranteed to be well-formed.
    pub async fn list_events(&self) -> Result<Vec<Event>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, ts, type, event, value FROM events ORDER BY id ASC")?;
            let mut rows = stmt.query([])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_event(row)?);
            }
            Ok(events)
        })
        .await
    }
}
