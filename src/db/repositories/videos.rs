use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::db::{connection::Database, helpers::format_timestamp};

impl Database {
    /// Watched flags keyed by path relative to the videos directory.
    pub async fn watched_map(&self) -> Result<HashMap<String, bool>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT video_path, watched FROM watched_videos")?;
            let mut rows = stmt.query([])?;
            let mut watched = HashMap::new();
            while let Some(row) = rows.next()? {
                let path: String = row.get(0)?;
                let flag: i64 = row.get(1)?;
                watched.insert(path, flag != 0);
            }
            Ok(watched)
        })
        .await
    }

    /// Flips the flag of a known video; an unknown video becomes watched.
    /// Returns the new state.
    pub async fn toggle_watched(&self, video_path: String, now: DateTime<Utc>) -> Result<bool> {
        self.execute(move |conn| {
            let stamp = format_timestamp(now);
            let current: Option<i64> = conn
                .query_row(
                    "SELECT watched FROM watched_videos WHERE video_path = ?1",
                    params![video_path],
                    |row| row.get(0),
                )
                .optional()?;

            let watched = match current {
                Some(flag) => {
                    let watched = flag == 0;
                    conn.execute(
                        "UPDATE watched_videos SET watched = ?1, watched_at = ?2 WHERE video_path = ?3",
                        params![watched, stamp, video_path],
                    )?;
                    watched
                }
                None => {
                    conn.execute(
                        "INSERT INTO watched_videos (video_path, watched, watched_at) VALUES (?1, 1, ?2)",
                        params![video_path, stamp],
                    )?;
                    true
                }
            };
            Ok(watched)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn toggle_inserts_then_flips() {
        let db = Database::open_in_memory().unwrap();
        let now = Utc::now();
        assert!(db.toggle_watched("lofi.mp4".into(), now).await.unwrap());
        assert!(!db.toggle_watched("lofi.mp4".into(), now).await.unwrap());
        assert!(db.toggle_watched("mix/a.mp4".into(), now).await.unwrap());

        let map = db.watched_map().await.unwrap();
        assert_eq!(map.get("lofi.mp4"), Some(&false));
        assert_eq!(map.get("mix/a.mp4"), Some(&true));
        assert_eq!(map.len(), 2);
    }
}
