use anyhow::Result;
use chrono::Utc;
use petmatch_types::models::Message;
use rusqlite::{Row, params};
use tracing::debug;
use uuid::Uuid;

use crate::Database;
use crate::applications::query_application;
use crate::models::{time, timestamp, uuid};

#[derive(Debug)]
pub enum SendOutcome {
    Sent(Message),
    ApplicationNotFound,
    /// The sender is neither the applicant nor the owner of the thread.
    NotParticipant,
}

const MESSAGE_COLUMNS: &str = "id, application_id, sender_id, receiver_id, content, created_at";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: uuid(row, 0)?,
        application_id: uuid(row, 1)?,
        sender_id: uuid(row, 2)?,
        receiver_id: uuid(row, 3)?,
        content: row.get(4)?,
        created_at: time(row, 5)?,
    })
}

impl Database {
    /// Posts to an application thread. The receiver is the other participant.
    pub fn send_message(&self, application_id: Uuid, sender_id: Uuid, content: &str) -> Result<SendOutcome> {
        self.with_conn(|conn| {
            let Some(app) = query_application(conn, application_id)? else {
                return Ok(SendOutcome::ApplicationNotFound);
            };
            let receiver_id = if sender_id == app.applicant_id {
                app.owner_id
            } else if sender_id == app.owner_id {
                app.applicant_id
            } else {
                return Ok(SendOutcome::NotParticipant);
            };

            let message = Message {
                id: Uuid::new_v4(),
                application_id,
                sender_id,
                receiver_id,
                content: content.to_string(),
                created_at: Utc::now(),
            };
            conn.execute(
                &format!("INSERT INTO messages ({MESSAGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    message.id.to_string(),
                    application_id.to_string(),
                    sender_id.to_string(),
                    receiver_id.to_string(),
                    message.content,
                    timestamp(message.created_at),
                ],
            )?;
            debug!("Message {} posted to application {}", message.id, application_id);

            // Re-read so the timestamp carries the stored precision.
            let sql = format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1");
            let stored = conn.query_row(&sql, [message.id.to_string()], message_from_row)?;
            Ok(SendOutcome::Sent(stored))
        })
    }

    /// Oldest first.
    pub fn get_messages(&self, application_id: Uuid) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE application_id = ?1
                 ORDER BY created_at, rowid"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([application_id.to_string()], message_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}
