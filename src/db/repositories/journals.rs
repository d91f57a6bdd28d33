use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, ToSql};

use crate::db::{
    connection::Database,
    helpers::{format_timestamp, parse_datetime},
    models::{Journal, JournalPatch},
};

const JOURNAL_COLUMNS: &str = "id, title, content, created_at, updated_at";

fn row_to_journal(row: &Row) -> Result<Journal> {
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;
    Ok(Journal {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        created_at: parse_datetime(&created_at, "created_at")?,
        updated_at: parse_datetime(&updated_at, "updated_at")?,
    })
}

fn load_journal(conn: &Connection, journal_id: i64) -> Result<Option<Journal>> {
    let mut stmt = conn.prepare(&format!("SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = ?1"))?;
    let mut rows = stmt.query(params![journal_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_journal(row)?)),
        None => Ok(None),
    }
}

impl Database {
    pub async fn insert_journal(
        &self,
        title: String,
        content: String,
        now: DateTime<Utc>,
    ) -> Result<Option<Journal>> {
        self.execute(move |conn| {
            let stamp = format_timestamp(now);
            conn.execute(
                "INSERT INTO journals (title, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)",
                params![title, content, stamp],
            )?;
            load_journal(conn, conn.last_insert_rowid())
        })
        .await
    }

    pub async fn list_journals(&self) -> Result<Vec<Journal>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOURNAL_COLUMNS} FROM journals ORDER BY id DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut journals = Vec::new();
            while let Some(row) = rows.next()? {
                journals.push(row_to_journal(row)?);
            }
            Ok(journals)
        })
        .await
    }

    pub async fn get_journal(&self, journal_id: i64) -> Result<Option<Journal>> {
        self.execute(move |conn| load_journal(conn, journal_id)).await
    }

    /// Writes the present fields and bumps `updated_at`.
    pub async fn update_journal(
        &self,
        journal_id: i64,
        patch: JournalPatch,
        now: DateTime<Utc>,
    ) -> Result<Option<Journal>> {
        self.execute(move |conn| {
            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(title) = patch.title {
                updates.push("title = ?");
                params_vec.push(Box::new(title));
            }
            if let Some(content) = patch.content {
                updates.push("content = ?");
                params_vec.push(Box::new(content));
            }

            updates.push("updated_at = ?");
            params_vec.push(Box::new(format_timestamp(now)));
            params_vec.push(Box::new(journal_id));

            let query = format!("UPDATE journals SET {} WHERE id = ?", updates.join(", "));
            let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|b| b.as_ref()).collect();
            if conn.execute(&query, params_refs.as_slice())? == 0 {
                return Ok(None);
            }

            load_journal(conn, journal_id)
        })
        .await
    }

    pub async fn delete_journal(&self, journal_id: i64) -> Result<bool> {
        self.execute(move |conn| {
            let deleted = conn.execute("DELETE FROM journals WHERE id = ?1", params![journal_id])?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 5, 21, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn update_bumps_updated_at_only() {
        let db = Database::open_in_memory().unwrap();
        let journal = db
            .insert_journal("Day 1".into(), "Read chapter 3".into(), now())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(journal.created_at, journal.updated_at);

        let later = now() + Duration::minutes(5);
        let updated = db
            .update_journal(
                journal.id,
                JournalPatch {
                    content: Some("Read chapters 3 and 4".into()),
                    ..JournalPatch::default()
                },
                later,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title.as_deref(), Some("Day 1"));
        assert_eq!(updated.content, "Read chapters 3 and 4");
        assert_eq!(updated.created_at, now());
        assert_eq!(updated.updated_at, later);
    }

    #[tokio::test]
    async fn missing_journal_reports_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_journal(3).await.unwrap().is_none());
        let patch = JournalPatch {
            title: Some("x".into()),
            ..JournalPatch::default()
        };
        assert!(db.update_journal(3, patch, now()).await.unwrap().is_none());
        assert!(!db.delete_journal(3).await.unwrap());
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let db = Database::open_in_memory().unwrap();
        for n in 0..3 {
            db.insert_journal(String::new(), format!("entry {n}"), now())
                .await
                .unwrap();
        }
        let contents: Vec<String> = db
            .list_journals()
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.content)
            .collect();
        assert_eq!(contents, vec!["entry 2", "entry 1", "entry 0"]);
    }
}
