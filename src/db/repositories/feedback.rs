use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_timestamp, parse_datetime},
    models::Feedback,
};

fn row_to_feedback(row: &Row) -> Result<Feedback> {
    let created_at: String = row.get("created_at")?;
    Ok(Feedback {
        id: row.get("id")?,
        mood: row.get("mood")?,
        text: row.get("text")?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

impl Database {
    pub async fn insert_feedback(
        &self,
        mood: Option<i64>,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Feedback> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO feedback (mood, text, created_at) VALUES (?1, ?2, ?3)",
                params![mood, text, format_timestamp(now)],
            )?;
            Ok(Feedback {
                id: conn.last_insert_rowid(),
                mood,
                text: Some(text),
                created_at: now,
            })
        })
        .await
    }

    /// Newest first.
    pub async fn list_feedback(&self) -> Result<Vec<Feedback>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, mood, text, created_at FROM feedback ORDER BY id DESC")?;
            let mut rows = stmt.query([])?;
            let mut entries = Vec::new();
            while let Some(row) = rows.next()? {
                entries.push(row_to_feedback(row)?);
            }
            Ok(entries)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn stores_optional_mood() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();
        db.insert_feedback(Some(4), "calm".into(), now).await.unwrap();
        db.insert_feedback(None, String::new(), now).await.unwrap();

        let entries = db.list_feedback().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].mood, None);
        assert_eq!(entries[1].mood, Some(4));
        assert_eq!(entries[1].text.as_deref(), Some("calm"));
        assert_eq!(entries[1].created_at, now);
    }
}
