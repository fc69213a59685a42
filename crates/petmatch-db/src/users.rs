use anyhow::Result;
use chrono::Utc;
use petmatch_types::models::{DeletionReport, Preferences, User};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;
use uuid::Uuid;

use crate::Database;
use crate::models::{optional_json, time, timestamp, to_json, uuid};

/// Identity supplied by the identity provider on first sign-in.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
}

/// Profile fields to overwrite. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub preferences: Option<Preferences>,
}

const USER_COLUMNS: &str = "id, external_id, email, name, profile_image, bio, location, phone, \
                            preferences, created_at, updated_at";

/// Applications that must go when user `?1` is deleted.
const DOOMED_APPLICATIONS: &str = "SELECT id FROM adoption_applications
     WHERE applicant_id = ?1
        OR owner_id = ?1
        OR pet_id IN (SELECT id FROM pets WHERE owner_id = ?1)";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid(row, 0)?,
        external_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        profile_image: row.get(4)?,
        bio: row.get(5)?,
        location: row.get(6)?,
        phone: row.get(7)?,
        preferences: optional_json(row, 8)?,
        created_at: time(row, 9)?,
        updated_at: time(row, 10)?,
    })
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let user = conn.query_row(&sql, [value], user_from_row).optional()?;
    Ok(user)
}

impl Database {
    /// Returns the user mapped to `new.external_id`, creating it first if this
    /// identity has never been seen.
    pub fn sync_user(&self, new: NewUser) -> Result<User> {
        self.with_conn(|conn| {
            let now = timestamp(Utc::now());
            let inserted = conn.execute(
                "INSERT INTO users (id, external_id, email, name, profile_image, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                 ON CONFLICT(external_id) DO NOTHING",
                params![
                    Uuid::new_v4().to_string(),
                    new.external_id,
                    new.email,
                    new.name,
                    new.profile_image,
                    now,
                ],
            )?;
            if inserted > 0 {
                info!("Created user for identity {}", new.external_id);
            }

            query_user(conn, "external_id", &new.external_id)?
                .ok_or_else(|| anyhow::anyhow!("User vanished after sync: {}", new.external_id))
        })
    }

    pub fn get_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "external_id", external_id))
    }

    pub fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn(|conn| query_user(conn, "id", &id.to_string()))
    }

    pub fn update_user(&self, id: Uuid, update: ProfileUpdate) -> Result<Option<User>> {
        let preferences = update.preferences.as_ref().map(to_json).transpose()?;

        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET
                    name = COALESCE(?2, name),
                    bio = COALESCE(?3, bio),
                    location = COALESCE(?4, location),
                    phone = COALESCE(?5, phone),
                    preferences = COALESCE(?6, preferences),
                    updated_at = ?7
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    update.name,
                    update.bio,
                    update.location,
                    update.phone,
                    preferences,
                    timestamp(Utc::now()),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", &id.to_string())
        })
    }

    /// Deletes the user and every record that references it, atomically.
    ///
    /// Removes messages in the user's threads, notifications addressed to the
    /// user or about the removed applications, applications where the user is
    /// applicant or owner (or that target the user's pets), the user's pets,
    /// and the user row. Returns `None` when no such user exists.
    pub fn delete_user(&self, id: Uuid) -> Result<Option<DeletionReport>> {
        let id = id.to_string();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let exists: bool =
                tx.query_row("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)", [&id], |r| {
                    r.get(0)
                })?;
            if !exists {
                return Ok(None);
            }

            let messages = tx.execute(
                &format!(
                    "DELETE FROM messages
                     WHERE sender_id = ?1
                        OR receiver_id = ?1
                        OR application_id IN ({DOOMED_APPLICATIONS})"
                ),
                [&id],
            )?;
            let notifications = tx.execute(
                &format!(
                    "DELETE FROM notifications
                     WHERE user_id = ?1
                        OR related_id IN ({DOOMED_APPLICATIONS})"
                ),
                [&id],
            )?;
            let applications = tx.execute(
                &format!("DELETE FROM adoption_applications WHERE id IN ({DOOMED_APPLICATIONS})"),
                [&id],
            )?;
            let pets = tx.execute("DELETE FROM pets WHERE owner_id = ?1", [&id])?;
            tx.execute("DELETE FROM users WHERE id = ?1", [&id])?;

            tx.commit()?;

            let report = DeletionReport {
                pets,
                applications,
                messages,
                notifications,
            };
            info!(
                "Deleted user {} ({} pets, {} applications, {} messages, {} notifications)",
                id, report.pets, report.applications, report.messages, report.notifications
            );
            Ok(Some(report))
        })
    }
}
