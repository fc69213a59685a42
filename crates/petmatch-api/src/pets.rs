use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use petmatch_query::{PetFilters, PetQueryEngine};
use petmatch_types::api::IdResponse;
use petmatch_types::attributes::{AgeBracket, ParseAttributeError};
use petmatch_types::models::{NewPet, Pet, PetPatch};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::{AppState, blocking};

/// Raw search parameters as sent by the browse page. Every field is optional
/// and `""` or `"all"` means "any".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetSearchQuery {
    pub search: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    pub breed: String,
    pub size: String,
    pub age: String,
    pub gender: String,
    pub activity_level: String,
    pub good_with_kids: String,
    pub good_with_pets: String,
    pub is_house_trained: String,
    #[serde(alias = "isCastrado")]
    pub is_neutered: String,
    pub location: String,
}

fn constraint(raw: &str) -> Option<&str> {
    let value = raw.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(value)
    }
}

/// Free-text filters keep surrounding whitespace. Only `""` and `"all"` are
/// "any".
fn text(raw: &str) -> Option<String> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(raw.to_string())
    }
}

fn attribute<T>(raw: &str) -> Result<Option<T>, ParseAttributeError>
where
    T: FromStr<Err = ParseAttributeError>,
{
    constraint(raw).map(str::parse).transpose()
}

fn flag(raw: &str) -> Option<bool> {
    match constraint(raw) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

impl PetSearchQuery {
    /// Splits into the free-text term and typed filters. Unknown age codes and
    /// non-boolean trait values are ignored. Other unknown codes are errors.
    pub fn into_filters(self) -> Result<(String, PetFilters), ParseAttributeError> {
        let filters = PetFilters {
            pet_type: attribute(&self.pet_type)?,
            breed: text(&self.breed),
            size: attribute(&self.size)?,
            age: constraint(&self.age).and_then(|v| v.parse::<AgeBracket>().ok()),
            gender: attribute(&self.gender)?,
            activity_level: attribute(&self.activity_level)?,
            good_with_kids: flag(&self.good_with_kids),
            good_with_pets: flag(&self.good_with_pets),
            is_house_trained: flag(&self.is_house_trained),
            is_neutered: flag(&self.is_neutered),
            location: text(&self.location),
        };
        Ok((self.search, filters))
    }
}

pub async fn list_pets(State(state): State<AppState>) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = blocking(&state, |db| PetQueryEngine::new(db).all_pets()).await?;
    Ok(Json(pets))
}

pub async fn search_pets(
    State(state): State<AppState>,
    Query(query): Query<PetSearchQuery>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let (search, filters) = query.into_filters()?;
    let pets = blocking(&state, move |db| {
        PetQueryEngine::new(db).filtered_pets(&search, &filters)
    })
    .await?;
    Ok(Json(pets))
}

pub async fn recommended_pets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = blocking(&state, move |db| {
        PetQueryEngine::new(db).recommended_pets(user.id, user.preferences.as_ref())
    })
    .await?;
    Ok(Json(pets))
}

pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Pet>, ApiError> {
    blocking(&state, move |db| db.get_pet(id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Pet"))
}

pub async fn create_pet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<NewPet>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let pet = blocking(&state, move |db| db.create_pet(user.id, req)).await?;
    Ok((StatusCode::CREATED, Json(IdResponse { id: pet.id })))
}

/// Loads a pet and checks that `user_id` owns it.
async fn owned_pet(state: &AppState, id: Uuid, user_id: Uuid) -> Result<Pet, ApiError> {
    let pet = blocking(state, move |db| db.get_pet(id))
        .await?
        .ok_or(ApiError::NotFound("Pet"))?;
    if pet.owner_id != user_id {
        return Err(ApiError::Forbidden("only the owner can change this pet".into()));
    }
    Ok(pet)
}

pub async fn update_pet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<PetPatch>,
) -> Result<Json<Pet>, ApiError> {
    let mut pet = owned_pet(&state, id, user.id).await?;
    patch.apply(&mut pet);
    pet.validate()?;

    blocking(&state, move |db| db.save_pet(&pet))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Pet"))
}

pub async fn delete_pet(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    owned_pet(&state, id, user.id).await?;

    if !blocking(&state, move |db| db.delete_pet(id)).await? {
        return Err(ApiError::NotFound("Pet"));
    }
    info!("User {} removed pet {}", user.id, id);
    Ok(StatusCode::NO_CONTENT)
}
