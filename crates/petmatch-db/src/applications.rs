use anyhow::Result;
use chrono::Utc;
use petmatch_types::attributes::ApplicationStatus;
use petmatch_types::models::{ADOPTION_REQUEST, AdoptionApplication, ApplicationDetails};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use tracing::{info, warn};
use uuid::Uuid;

use crate::Database;
use crate::models::{json, parsed, time, timestamp, to_json, uuid};
use crate::notifications::insert_notification;
use crate::pets::query_pet;

#[derive(Debug, Clone)]
pub struct NewApplication {
    pub pet_id: Uuid,
    pub applicant_id: Uuid,
    /// Display name used in the owner's notification.
    pub applicant_name: String,
    pub details: ApplicationDetails,
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Created(AdoptionApplication),
    PetNotFound,
    OwnPet,
    PetUnavailable,
    /// The applicant already applied for this pet.
    Duplicate,
}

#[derive(Debug)]
pub enum DecisionOutcome {
    Updated(AdoptionApplication),
    NotFound,
    NotOwner,
    AlreadyDecided(ApplicationStatus),
}

const APPLICATION_COLUMNS: &str =
    "id, pet_id, applicant_id, owner_id, status, details, created_at, updated_at";

fn application_from_row(row: &Row<'_>) -> rusqlite::Result<AdoptionApplication> {
    Ok(AdoptionApplication {
        id: uuid(row, 0)?,
        pet_id: uuid(row, 1)?,
        applicant_id: uuid(row, 2)?,
        owner_id: uuid(row, 3)?,
        status: parsed(row, 4)?,
        details: json(row, 5)?,
        created_at: time(row, 6)?,
        updated_at: time(row, 7)?,
    })
}

pub(crate) fn query_application(conn: &Connection, id: Uuid) -> Result<Option<AdoptionApplication>> {
    let sql = format!("SELECT {APPLICATION_COLUMNS} FROM adoption_applications WHERE id = ?1");
    let app = conn.query_row(&sql, [id.to_string()], application_from_row).optional()?;
    Ok(app)
}

fn query_applications(conn: &Connection, column: &str, id: Uuid) -> Result<Vec<AdoptionApplication>> {
    let sql = format!(
        "SELECT {APPLICATION_COLUMNS} FROM adoption_applications WHERE {column} = ?1 ORDER BY rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([id.to_string()], application_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// True only for the UNIQUE(pet_id, applicant_id) violation. Foreign-key and
/// check failures are real errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl Database {
    /// Files an application and notifies the pet's owner in one transaction.
    ///
    /// The owner is copied from the pet as it is right now.
    pub fn submit_application(&self, new: NewApplication) -> Result<SubmitOutcome> {
        let details = to_json(&new.details)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(pet) = query_pet(&tx, new.pet_id)? else {
                return Ok(SubmitOutcome::PetNotFound);
            };
            if pet.owner_id == new.applicant_id {
                return Ok(SubmitOutcome::OwnPet);
            }
            if !pet.is_available {
                return Ok(SubmitOutcome::PetUnavailable);
            }

            let id = Uuid::new_v4();
            let now = Utc::now();
            let inserted = tx.execute(
                "INSERT INTO adoption_applications
                    (id, pet_id, applicant_id, owner_id, status, details, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
                params![
                    id.to_string(),
                    pet.id.to_string(),
                    new.applicant_id.to_string(),
                    pet.owner_id.to_string(),
                    ApplicationStatus::Pending.as_str(),
                    details,
                    timestamp(now),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(e) if is_unique_violation(&e) => {
                    warn!("Duplicate application by {} for pet {}", new.applicant_id, pet.id);
                    return Ok(SubmitOutcome::Duplicate);
                }
                Err(e) => return Err(e.into()),
            }

            insert_notification(
                &tx,
                pet.owner_id,
                ADOPTION_REQUEST,
                "New adoption request",
                &format!("{} wants to adopt {}", new.applicant_name, pet.name),
                Some(&id.to_string()),
            )?;

            let app = query_application(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Application vanished after insert: {}", id))?;
            tx.commit()?;

            info!("Application {} filed by {} for pet {}", id, new.applicant_id, pet.id);
            Ok(SubmitOutcome::Created(app))
        })
    }

    pub fn get_application(&self, id: Uuid) -> Result<Option<AdoptionApplication>> {
        self.with_conn(|conn| query_application(conn, id))
    }

    pub fn get_applications_by_applicant(&self, applicant_id: Uuid) -> Result<Vec<AdoptionApplication>> {
        self.with_conn(|conn| query_applications(conn, "applicant_id", applicant_id))
    }

    pub fn get_applications_by_owner(&self, owner_id: Uuid) -> Result<Vec<AdoptionApplication>> {
        self.with_conn(|conn| query_applications(conn, "owner_id", owner_id))
    }

    pub fn get_application_by_pet_and_applicant(
        &self,
        pet_id: Uuid,
        applicant_id: Uuid,
    ) -> Result<Option<AdoptionApplication>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {APPLICATION_COLUMNS} FROM adoption_applications
                 WHERE pet_id = ?1 AND applicant_id = ?2"
            );
            let app = conn
                .query_row(
                    &sql,
                    [pet_id.to_string(), applicant_id.to_string()],
                    application_from_row,
                )
                .optional()?;
            Ok(app)
        })
    }

    /// Accepts or rejects a pending application on behalf of `acting_user`,
    /// who must be the owner recorded on it.
    pub fn decide_application(
        &self,
        id: Uuid,
        acting_user: Uuid,
        status: ApplicationStatus,
    ) -> Result<DecisionOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let Some(app) = query_application(&tx, id)? else {
                return Ok(DecisionOutcome::NotFound);
            };
            if app.owner_id != acting_user {
                return Ok(DecisionOutcome::NotOwner);
            }
            if !app.status.can_transition_to(status) {
                return Ok(DecisionOutcome::AlreadyDecided(app.status));
            }

            tx.execute(
                "UPDATE adoption_applications SET status = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), status.as_str(), timestamp(Utc::now())],
            )?;
            let app = query_application(&tx, id)?
                .ok_or_else(|| anyhow::anyhow!("Application vanished after update: {}", id))?;
            tx.commit()?;

            info!("Application {} marked {}", id, status);
            Ok(DecisionOutcome::Updated(app))
        })
    }
}
