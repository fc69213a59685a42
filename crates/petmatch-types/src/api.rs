use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::{ApplicationStatus, ParseAttributeError};
use crate::models::{ApplicationDetails, Preferences};

// -- Identity --

/// Claims carried by identity-provider tokens. `sub` is the external user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncUserRequest {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub preferences: Option<PreferencesInput>,
}

/// Preferences as submitted by the settings form.
///
/// Single-valued fields treat `""`, `"all"` and `"none"` as unset. Any other
/// unrecognised code is rejected instead of being stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesInput {
    pub pet_type: Vec<String>,
    pub size: Vec<String>,
    pub age: Vec<String>,
    pub activity_level: Option<String>,
    pub living_space: Option<String>,
    pub experience: Option<String>,
}

fn parse_list<T>(values: &[String]) -> Result<Vec<T>, ParseAttributeError>
where
    T: std::str::FromStr<Err = ParseAttributeError> + PartialEq,
{
    let mut parsed = Vec::with_capacity(values.len());
    for value in values {
        let item: T = value.parse()?;
        if !parsed.contains(&item) {
            parsed.push(item);
        }
    }
    Ok(parsed)
}

fn parse_optional<T>(value: Option<&str>) -> Result<Option<T>, ParseAttributeError>
where
    T: std::str::FromStr<Err = ParseAttributeError>,
{
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case("all") || v.eq_ignore_ascii_case("none") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

impl TryFrom<PreferencesInput> for Preferences {
    type Error = ParseAttributeError;

    fn try_from(input: PreferencesInput) -> Result<Self, Self::Error> {
        Ok(Preferences {
            pet_type: parse_list(&input.pet_type)?,
            size: parse_list(&input.size)?,
            age: parse_list(&input.age)?,
            activity_level: parse_optional(input.activity_level.as_deref())?,
            living_space: parse_optional(input.living_space.as_deref())?,
            experience: parse_optional(input.experience.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: Uuid,
}

// -- Applications --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateApplicationRequest {
    pub pet_id: Uuid,
    pub application_data: ApplicationDetails,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
}

// -- Notifications --

#[derive(Debug, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}
