use anyhow::Result;
use chrono::{DateTime, Utc};
use log::info;
use rusqlite::{params, Connection, Row, ToSql};

use crate::db::{
    connection::Database,
    helpers::{format_timestamp, parse_datetime},
    models::{NewProfile, Profile, ProfileDeletion, ProfilePatch},
};

const PROFILE_COLUMNS: &str = "id, name, mode, theme, mood, font_scale, is_active, created_at";

fn row_to_profile(row: &Row) -> Result<Profile> {
    let created_at: String = row.get("created_at")?;
    Ok(Profile {
        id: row.get("id")?,
        name: row.get("name")?,
        mode: row.get("mode")?,
        theme: row.get("theme")?,
        mood: row.get("mood")?,
        font_scale: row.get("font_scale")?,
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn query_profiles(conn: &Connection, clause: &str) -> Result<Vec<Profile>> {
    let mut stmt = conn.prepare(&format!("SELECT {PROFILE_COLUMNS} FROM profiles {clause}"))?;
    let mut rows = stmt.query([])?;
    let mut profiles = Vec::new();
    while let Some(row) = rows.next()? {
        profiles.push(row_to_profile(row)?);
    }
    Ok(profiles)
}

fn load_profile(conn: &Connection, profile_id: i64) -> Result<Option<Profile>> {
    let mut stmt = conn.prepare(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"))?;
    let mut rows = stmt.query(params![profile_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_profile(row)?)),
        None => Ok(None),
    }
}

fn insert_profile_row(
    conn: &Connection,
    profile: &NewProfile,
    active: bool,
    now: DateTime<Utc>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO profiles (name, mode, theme, mood, font_scale, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            profile.name,
            profile.mode,
            profile.theme,
            profile.mood,
            profile.font_scale,
            active,
            format_timestamp(now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl Database {
    /// Seeds the `Default` profile, active, when the table is empty.
    pub async fn ensure_default_profile(&self, now: DateTime<Utc>) -> Result<()> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
            if count == 0 {
                let default = NewProfile {
                    name: "Default".into(),
                    mode: "study".into(),
                    theme: "pastel".into(),
                    mood: "focus".into(),
                    font_scale: 1.0,
                };
                insert_profile_row(conn, &default, true, now)?;
                info!("Seeded default profile");
            }
            Ok(())
        })
        .await
    }

    /// New profiles start inactive.
    pub async fn insert_profile(
        &self,
        profile: NewProfile,
        now: DateTime<Utc>,
    ) -> Result<Option<Profile>> {
        self.execute(move |conn| {
            let profile_id = insert_profile_row(conn, &profile, false, now)?;
            load_profile(conn, profile_id)
        })
        .await
    }

    /// Active profile first, then newest first.
    pub async fn list_profiles(&self) -> Result<Vec<Profile>> {
        self.execute(|conn| query_profiles(conn, "ORDER BY is_active DESC, id DESC"))
            .await
    }

    pub async fn active_profile(&self) -> Result<Option<Profile>> {
        self.execute(|conn| {
            Ok(query_profiles(conn, "WHERE is_active = 1 ORDER BY id DESC LIMIT 1")?
                .into_iter()
                .next())
        })
        .await
    }

    /// Makes `profile_id` the only active profile. An unknown id changes
    /// nothing and returns `None`.
    pub async fn activate_profile(&self, profile_id: i64) -> Result<Option<Profile>> {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            if load_profile(&tx, profile_id)?.is_none() {
                return Ok(None);
            }
            tx.execute("UPDATE profiles SET is_active = 0", [])?;
            tx.execute(
                "UPDATE profiles SET is_active = 1 WHERE id = ?1",
                params![profile_id],
            )?;
            let profile = load_profile(&tx, profile_id)?;
            tx.commit()?;
            Ok(profile)
        })
        .await
    }

    pub async fn update_profile(
        &self,
        profile_id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<Profile>> {
        self.execute(move |conn| {
            let mut updates = Vec::new();
            let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

            if let Some(name) = patch.name {
                updates.push("name = ?");
                params_vec.push(Box::new(name));
            }
            if let Some(mode) = patch.mode {
                updates.push("mode = ?");
                params_vec.push(Box::new(mode));
            }
            if let Some(theme) = patch.theme {
                updates.push("theme = ?");
                params_vec.push(Box::new(theme));
            }
            if let Some(mood) = patch.mood {
                updates.push("mood = ?");
                params_vec.push(Box::new(mood));
            }
            if let Some(font_scale) = patch.font_scale {
                updates.push("font_scale = ?");
                params_vec.push(Box::new(font_scale));
            }

            if !updates.is_empty() {
                let query = format!("UPDATE profiles SET {} WHERE id = ?", updates.join(", "));
                params_vec.push(Box::new(profile_id));
                let params_refs: Vec<&dyn ToSql> =
                    params_vec.iter().map(|b| b.as_ref()).collect();
                conn.execute(&query, params_refs.as_slice())?;
            }

            load_profile(conn, profile_id)
        })
        .await
    }

    /// Deletes a profile unless it is the last one or the active one.
    pub async fn delete_profile(&self, profile_id: i64) -> Result<ProfileDeletion> {
        self.execute(move |conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM profiles", [], |row| row.get(0))?;
            if count <= 1 {
                return Ok(ProfileDeletion::LastProfile);
            }
            if let Some(profile) = load_profile(conn, profile_id)? {
                if profile.is_active {
                    return Ok(ProfileDeletion::ActiveProfile);
                }
            }
            let deleted = conn.execute("DELETE FROM profiles WHERE id = ?1", params![profile_id])?;
            Ok(if deleted == 0 {
                ProfileDeletion::NotFound
            } else {
                ProfileDeletion::Deleted
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 4, 8, 0, 0).unwrap()
    }

    fn profile(name: &str) -> NewProfile {
        NewProfile {
            name: name.into(),
            mode: "exam".into(),
            theme: "gruvbox".into(),
            mood: "zen".into(),
            font_scale: 1.25,
        }
    }

    #[tokio::test]
    async fn default_profile_is_seeded_once() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_default_profile(now()).await.unwrap();
        db.ensure_default_profile(now()).await.unwrap();

        let profiles = db.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 1);
        let default = &profiles[0];
        assert_eq!(default.name, "Default");
        assert_eq!(default.mode, "study");
        assert_eq!(default.theme.as_deref(), Some("pastel"));
        assert_eq!(default.font_scale, Some(1.0));
        assert!(default.is_active);
    }

    #[tokio::test]
    async fn activation_is_exclusive_and_ignores_unknown_ids() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_default_profile(now()).await.unwrap();
        let exam = db.insert_profile(profile("Exams"), now()).await.unwrap().unwrap();
        assert!(!exam.is_active);

        let activated = db.activate_profile(exam.id).await.unwrap().unwrap();
        assert!(activated.is_active);
        let profiles = db.list_profiles().await.unwrap();
        assert_eq!(profiles[0].id, exam.id);
        assert_eq!(profiles.iter().filter(|p| p.is_active).count(), 1);

        assert!(db.activate_profile(999).await.unwrap().is_none());
        assert_eq!(db.active_profile().await.unwrap().unwrap().id, exam.id);
    }

    #[tokio::test]
    async fn delete_guards() {
        let db = Database::open_in_memory().unwrap();
        db.ensure_default_profile(now()).await.unwrap();
        let default = db.active_profile().await.unwrap().unwrap();

        assert_eq!(
            db.delete_profile(default.id).await.unwrap(),
            ProfileDeletion::LastProfile
        );

        let other = db.insert_profile(profile("Work"), now()).await.unwrap().unwrap();
        assert_eq!(
            db.delete_profile(default.id).await.unwrap(),
            ProfileDeletion::ActiveProfile
        );
        assert_eq!(db.delete_profile(404).await.unwrap(), ProfileDeletion::NotFound);
        assert_eq!(
            db.delete_profile(other.id).await.unwrap(),
            ProfileDeletion::Deleted
        );
    }

    #[tokio::test]
    async fn patch_updates_selected_columns() {
        let db = Database::open_in_memory().unwrap();
        let created = db.insert_profile(profile("Night"), now()).await.unwrap().unwrap();
        let updated = db
            .update_profile(
                created.id,
                ProfilePatch {
                    theme: Some("catppuccin".into()),
                    font_scale: Some(0.9),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.theme.as_deref(), Some("catppuccin"));
        assert_eq!(updated.font_scale, Some(0.9));
        assert_eq!(updated.name, "Night");
        assert_eq!(updated.mode, "exam");
    }
}
