use axum::{
    Json,
    extract::{Path, State},
};
use petmatch_db::{NewUser, ProfileUpdate};
use petmatch_types::api::{SyncUserRequest, UpdateUserRequest};
use petmatch_types::models::{DeletionReport, Pet, Preferences, User};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::identity::Identity;
use crate::middleware::CurrentUser;
use crate::state::{AppState, blocking};

/// Creates the local user for a provider identity on first sign-in. Calling it
/// again returns the existing user unchanged.
pub async fn sync_user(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<SyncUserRequest>,
) -> Result<Json<User>, ApiError> {
    let email = req.email.trim().to_string();
    let name = req.name.trim().to_string();
    if email.is_empty() || name.is_empty() {
        return Err(ApiError::BadRequest("email and name are required".into()));
    }
    if identity.email.as_deref().is_some_and(|claimed| !claimed.eq_ignore_ascii_case(&email)) {
        warn!("Sync for {} sent an email that differs from the token", identity.external_id);
    }

    let new = NewUser {
        external_id: identity.external_id,
        email,
        name,
        profile_image: req.profile_image,
    };
    let user = blocking(&state, move |db| db.sync_user(new)).await?;
    Ok(Json(user))
}

pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let preferences = req.preferences.map(Preferences::try_from).transpose()?;
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("name cannot be empty".into()));
    }

    let update = ProfileUpdate {
        name: req.name,
        bio: req.bio,
        location: req.location,
        phone: req.phone,
        preferences,
    };
    blocking(&state, move |db| db.update_user(user.id, update))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

/// Deletes the caller's account together with their pets, applications,
/// messages and notifications.
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<DeletionReport>, ApiError> {
    let report = blocking(&state, move |db| db.delete_user(user.id))
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!("Account {} closed by its owner", user.external_id);
    Ok(Json(report))
}

pub async fn get_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError> {
    blocking(&state, move |db| db.get_user_by_id(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("User"))
}

/// All listings of a user, including adopted ones.
pub async fn get_user_pets(
    State(state): State<AppState>,
    _caller: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = blocking(&state, move |db| db.get_pets_by_owner(id)).await?;
    Ok(Json(pets))
}
