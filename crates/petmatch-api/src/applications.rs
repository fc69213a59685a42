use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use petmatch_db::{DecisionOutcome, NewApplication, SubmitOutcome};
use petmatch_types::api::{CreateApplicationRequest, UpdateApplicationStatusRequest};
use petmatch_types::attributes::ApplicationStatus;
use petmatch_types::models::AdoptionApplication;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, blocking};

pub async fn create_application(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.application_data.validate()?;

    let new = NewApplication {
        pet_id: req.pet_id,
        applicant_id: user.id,
        applicant_name: user.name,
        details: req.application_data,
    };
    match blocking(&state, move |db| db.submit_application(new)).await? {
        SubmitOutcome::Created(app) => Ok((StatusCode::CREATED, Json(app))),
        SubmitOutcome::PetNotFound => Err(ApiError::NotFound("Pet")),
        SubmitOutcome::OwnPet => Err(ApiError::BadRequest("you cannot adopt your own pet".into())),
        SubmitOutcome::PetUnavailable => {
            Err(ApiError::Conflict("this pet is no longer available".into()))
        }
        SubmitOutcome::Duplicate => {
            Err(ApiError::Conflict("you already applied for this pet".into()))
        }
    }
}

pub async fn sent_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AdoptionApplication>>, ApiError> {
    let apps = blocking(&state, move |db| db.get_applications_by_applicant(user.id)).await?;
    Ok(Json(apps))
}

pub async fn received_applications(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<AdoptionApplication>>, ApiError> {
    let apps = blocking(&state, move |db| db.get_applications_by_owner(user.id)).await?;
    Ok(Json(apps))
}

/// The caller's application for one pet, or `null` if they never applied.
pub async fn my_application_for_pet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pet_id): Path<Uuid>,
) -> Result<Json<Option<AdoptionApplication>>, ApiError> {
    let app = blocking(&state, move |db| {
        db.get_application_by_pet_and_applicant(pet_id, user.id)
    })
    .await?;
    Ok(Json(app))
}

pub async fn update_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplicationStatusRequest>,
) -> Result<Json<AdoptionApplication>, ApiError> {
    if req.status == ApplicationStatus::Pending {
        return Err(ApiError::BadRequest("status must be accepted or rejected".into()));
    }

    match blocking(&state, move |db| db.decide_application(id, user.id, req.status)).await? {
        DecisionOutcome::Updated(app) => Ok(Json(app)),
        DecisionOutcome::NotFound => Err(ApiError::NotFound("Application")),
        DecisionOutcome::NotOwner => Err(ApiError::Forbidden(
            "only the pet's owner can decide on an application".into(),
        )),
        DecisionOutcome::AlreadyDecided(status) => {
            Err(ApiError::Conflict(format!("application is already {status}")))
        }
    }
}
