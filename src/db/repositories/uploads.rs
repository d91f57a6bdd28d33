use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use crate::db::{connection::Database, helpers::format_timestamp, models::Upload};

impl Database {
    pub async fn insert_upload(
        &self,
        filename: String,
        original_name: String,
        mime: String,
        size: i64,
        now: DateTime<Utc>,
    ) -> Result<Upload> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO uploads (filename, original_name, mime, size, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![filename, original_name, mime, size, format_timestamp(now)],
            )?;
            Ok(Upload {
                id: conn.last_insert_rowid(),
                filename,
                original_name: Some(original_name),
                mime: Some(mime),
                size: Some(size),
                created_at: now,
            })
        })
        .await
    }

    #[cfg(test)]
    pub(crate) async fn count_uploads(&self) -> Result<i64> {
        self.execute(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM uploads", [], |row| row.get(0))?)
        })
        .await
    }
}
