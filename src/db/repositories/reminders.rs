use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, ToSql};

use crate::db::{
    connection::Database,
    helpers::{format_timestamp, parse_datetime},
    models::{NewReminder, Reminder, ReminderPatch},
};

const REMINDER_COLUMNS: &str = "id, text, interval_min, active, use_tts, use_notif, created_at";

fn row_to_reminder(row: &Row) -> Result<Reminder> {
    let created_at: String = row.get("created_at")?;
    Ok(Reminder {
        id: row.get("id")?,
        text: row.get("text")?,
        interval_min: row.get("interval_min")?,
        active: row.get::<_, i64>("active")? != 0,
        use_tts: row.get::<_, i64>("use_tts")? != 0,
        use_notif: row.get::<_, i64>("use_notif")? != 0,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn load_reminder(conn: &Connection, reminder_id: i64) -> Result<Option<Reminder>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {REMINDER_COLUMNS} FROM reminders WHERE id = ?1"))?;
    let mut rows = stmt.query(params![reminder_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_reminder(row)?)),
        None => Ok(None),
    }
}

impl Database {
    pub async fn insert_reminder(
        &self,
        reminder: NewReminder,
        now: DateTime<Utc>,
    ) -> Result<Option<Reminder>> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO reminders (text, interval_min, active, use_tts, use_notif, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    reminder.text,
                    reminder.interval_min,
                    reminder.active,
                    reminder.use_tts,
                    reminder.use_notif,
                    format_timestamp(now),
                ],
            )?;
            load_reminder(conn, conn.last_insert_rowid())
        })
        .await
    }

    pub async fn list_reminders(&self) -> Result<Vec<Reminder>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REMINDER_COLUMNS} FROM reminders ORDER BY id DESC"
            ))?;
            let mut rows = stmt.query([])?;
            let mut reminders = Vec::new();
            while let Some(row) = rows.next()? {
                reminders.push(row_to_reminder(row)?);
            }
            Ok(reminders)
        })
        .await
    }

    /// Applies the fields present in `patch`. `None` means the reminder does
    /// not exist. An empty patch only re-reads the row.
    pub async fn update_reminder(
        &self,
        reminder_id: i64,
        patch: ReminderPatch,
    ) -> Result<Option<Reminder>> {
        self.execute(move |conn| {
            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(text) = patch.text {
                updates.push("text = ?");
                params_vec.push(Box::new(text));
            }
            if let Some(interval_min) = patch.interval_min {
                updates.push("interval_min = ?");
                params_vec.push(Box::new(interval_min));
            }
            if let Some(active) = patch.active {
                updates.push("active = ?");
                params_vec.push(Box::new(active));
            }
            if let Some(use_tts) = patch.use_tts {
                updates.push("use_tts = ?");
                params_vec.push(Box::new(use_tts));
            }
            if let Some(use_notif) = patch.use_notif {
                updates.push("use_notif = ?");
                params_vec.push(Box::new(use_notif));
            }

            if !updates.is_empty() {
                let query = format!("UPDATE reminders SET {} WHERE id = ?", updates.join(", "));
                params_vec.push(Box::new(reminder_id));
                let params_refs: Vec<&dyn ToSql> =
                    params_vec.iter().map(|b| b.as_ref()).collect();
                conn.execute(&query, params_refs.as_slice())?;
            }

            load_reminder(conn, reminder_id)
        })
        .await
    }

    /// Returns false when no row matched.
    pub async fn delete_reminder(&self, reminder_id: i64) -> Result<bool> {
        self.execute(move |conn| {
            let deleted = conn.execute("DELETE FROM reminders WHERE id = ?1", params![reminder_id])?;
            Ok(deleted > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 3, 9, 0, 0).unwrap()
    }

    fn hydrate() -> NewReminder {
        NewReminder {
            text: "Drink water".into(),
            interval_min: 30,
            active: true,
            use_tts: true,
            use_notif: false,
        }
    }

    #[tokio::test]
    async fn insert_and_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_reminder(hydrate(), now()).await.unwrap().unwrap();
        let second = db
            .insert_reminder(
                NewReminder {
                    text: "Stretch".into(),
                    ..hydrate()
                },
                now(),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(first.created_at, now());
        let ids: Vec<i64> = db
            .list_reminders()
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn patch_touches_only_present_fields() {
        let db = Database::open_in_memory().unwrap();
        let reminder = db.insert_reminder(hydrate(), now()).await.unwrap().unwrap();

        let updated = db
            .update_reminder(
                reminder.id,
                ReminderPatch {
                    interval_min: Some(45),
                    use_notif: Some(true),
                    ..ReminderPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.interval_min, 45);
        assert!(updated.use_notif);
        assert_eq!(updated.text, "Drink water");
        assert!(updated.active);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let db = Database::open_in_memory().unwrap();
        let missing = db
            .update_reminder(
                9,
                ReminderPatch {
                    active: Some(false),
                    ..ReminderPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(missing.is_none());
        assert!(!db.delete_reminder(9).await.unwrap());

        let reminder = db.insert_reminder(hydrate(), now()).await.unwrap().unwrap();
        assert!(db.delete_reminder(reminder.id).await.unwrap());
        assert!(db.list_reminders().await.unwrap().is_empty());
    }
}
