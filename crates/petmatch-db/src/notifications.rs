use anyhow::Result;
use chrono::Utc;
use petmatch_types::models::Notification;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::Database;
use crate::models::{time, timestamp, uuid};

const NOTIFICATION_COLUMNS: &str = "id, user_id, kind, title, message, is_read, related_id, created_at";

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: uuid(row, 0)?,
        user_id: uuid(row, 1)?,
        kind: row.get(2)?,
        title: row.get(3)?,
        message: row.get(4)?,
        is_read: row.get(5)?,
        related_id: row.get(6)?,
        created_at: time(row, 7)?,
    })
}

/// Inserts an unread notification. Shared with the application transaction.
pub(crate) fn insert_notification(
    conn: &Connection,
    user_id: Uuid,
    kind: &str,
    title: &str,
    message: &str,
    related_id: Option<&str>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    conn.execute(
        "INSERT INTO notifications (id, user_id, kind, title, message, is_read, related_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7)",
        params![
            id.to_string(),
            user_id.to_string(),
            kind,
            title,
            message,
            related_id,
            timestamp(Utc::now()),
        ],
    )?;
    Ok(id)
}

impl Database {
    pub fn create_notification(
        &self,
        user_id: Uuid,
        kind: &str,
        title: &str,
        message: &str,
        related_id: Option<&str>,
    ) -> Result<Notification> {
        self.with_conn(|conn| {
            let id = insert_notification(conn, user_id, kind, title, message, related_id)?;
            let sql = format!("SELECT {NOTIFICATION_COLUMNS} FROM notifications WHERE id = ?1");
            conn.query_row(&sql, [id.to_string()], notification_from_row)
                .optional()?
                .ok_or_else(|| anyhow::anyhow!("Notification vanished after insert: {}", id))
        })
    }

    /// Newest first.
    pub fn get_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {NOTIFICATION_COLUMNS} FROM notifications
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id.to_string()], notification_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    pub fn unread_count(&self, user_id: Uuid) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND is_read = 0",
                [user_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
    }

    /// Marks one notification read. Returns false unless it belongs to `user_id`.
    pub fn mark_notification_read(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
                [id.to_string(), user_id.to_string()],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn mark_all_notifications_read(&self, user_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE user_id = ?1 AND is_read = 0",
                [user_id.to_string()],
            )?;
            Ok(changed)
        })
    }
}
