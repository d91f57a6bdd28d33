use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{format_timestamp, to_i64, to_u64},
        models::{NewTimer, Timer, TimerKind, TimerStatus},
    },
    timer::{state::Transition, TimerError},
};

const TIMER_COLUMNS: &str = "id, kind, label, duration_ms, status, started_at, paused_at, \
     accumulated_ms, created_at, updated_at";

fn row_to_timer(row: &Row) -> Result<Timer> {
    let kind: String = row.get("kind")?;
    let status: String = row.get("status")?;
    let duration_ms: Option<i64> = row.get("duration_ms")?;
    let accumulated_ms: Option<i64> = row.get("accumulated_ms")?;
    let label: Option<String> = row.get("label")?;

    Ok(Timer {
        id: row.get("id")?,
        kind: TimerKind::normalize(&kind),
        label: label.filter(|l| !l.is_empty()),
        duration_ms: duration_ms
            .map(|ms| to_u64(ms, "duration_ms"))
            .transpose()?,
        status: TimerStatus::parse(&status)?,
        started_at: row.get("started_at")?,
        paused_at: row.get("paused_at")?,
        accumulated_ms: to_u64(accumulated_ms.unwrap_or(0), "accumulated_ms")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn load_timer(conn: &Connection, timer_id: i64) -> Result<Option<Timer>> {
    let mut stmt = conn.prepare(&format!("SELECT {TIMER_COLUMNS} FROM timers WHERE id = ?1"))?;
    let mut rows = stmt.query(params![timer_id])?;
    match rows.next()? {
        Some(row) => Ok(Some(row_to_timer(row)?)),
        None => Ok(None),
    }
}

/// Writes the mutable columns back if the row still carries `token` as its
/// `updated_at`. Returns false when the row was changed in between.
fn write_transition(conn: &Connection, timer: &Timer, token: &str) -> Result<bool> {
    let changed = conn.execute(
        "UPDATE timers
         SET status = ?1,
             started_at = ?2,
             paused_at = ?3,
             accumulated_ms = ?4,
             updated_at = ?5
         WHERE id = ?6 AND updated_at = ?7",
        params![
            timer.status.as_str(),
            timer.started_at,
            timer.paused_at,
            to_i64(timer.accumulated_ms)?,
            timer.updated_at,
            timer.id,
            token,
        ],
    )?;
    Ok(changed == 1)
}

impl Database {
    pub async fn insert_timer(&self, timer: NewTimer, now: DateTime<Utc>) -> Result<Timer> {
        self.execute(move |conn| {
            let stamp = format_timestamp(now);
            conn.execute(
                "INSERT INTO timers (kind, label, duration_ms, status, started_at, paused_at, accumulated_ms, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, 0, ?5, ?5)",
                params![
                    timer.kind.as_str(),
                    timer.label,
                    timer.duration_ms.map(to_i64).transpose()?,
                    TimerStatus::Running.as_str(),
                    stamp,
                ],
            )?;

            let timer_id = conn.last_insert_rowid();
            load_timer(conn, timer_id)?.ok_or_else(|| anyhow!("Timer not found after insert"))
        })
        .await
    }

    #[cfg(test)]
    pub async fn get_timer(&self, timer_id: i64) -> Result<Option<Timer>> {
        self.execute(move |conn| load_timer(conn, timer_id)).await
    }

    /// All timers, newest first. `active_only` keeps running and paused ones.
    pub async fn list_timers(&self, active_only: bool) -> Result<Vec<Timer>> {
        self.execute(move |conn| {
            let filter = if active_only {
                let active: Vec<String> = TimerStatus::ALL
                    .iter()
                    .filter(|status| status.is_active())
                    .map(|status| format!("'{}'", status.as_str()))
                    .collect();
                format!("WHERE status IN ({})", active.join(", "))
            } else {
                String::new()
            };
            let mut stmt = conn.prepare(&format!(
                "SELECT {TIMER_COLUMNS} FROM timers {filter} ORDER BY id DESC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut timers = Vec::new();
            while let Some(row) = rows.next()? {
                timers.push(row_to_timer(row)?);
            }
            Ok(timers)
        })
        .await
    }

    /// Loads, transitions and writes back one timer inside a single DB task.
    ///
    /// The write is guarded by the `updated_at` value that was read, so a
    /// row changed behind our back (another process sharing the file) is
    /// reported as [`TimerError::Conflict`] rather than overwritten.
    pub async fn transition_timer(
        &self,
        timer_id: i64,
        transition: Transition,
        now: DateTime<Utc>,
    ) -> Result<Timer, TimerError> {
        self.execute(move |conn| {
            let Some(mut timer) = load_timer(conn, timer_id)? else {
                return Ok(Err(TimerError::NotFound(timer_id)));
            };
            let token = timer.updated_at.clone();

            if let Err(err) = transition.apply(&mut timer, now) {
                return Ok(Err(err));
            }

            if !write_transition(conn, &timer, &token)? {
                return Ok(Err(TimerError::Conflict(timer_id)));
            }

            Ok(load_timer(conn, timer_id)?.ok_or(TimerError::NotFound(timer_id)))
        })
        .await?
    }

    #[cfg(test)]
    pub(crate) async fn overwrite_timer_field(
        &self,
        timer_id: i64,
        column: &'static str,
        value: Option<String>,
    ) -> Result<()> {
        self.execute(move |conn| {
            conn.execute(
                &format!("UPDATE timers SET {column} = ?1 WHERE id = ?2"),
                params![value, timer_id],
            )?;
            Ok(())
        })
        .await
    }
}
