use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::{
    ActivityLevel, AgeBracket, ApplicationStatus, Experience, Gender, LivingSpace, OtherPets,
    PetSize, PetType,
};

/// Notification tag written when someone applies for a pet.
pub const ADOPTION_REQUEST: &str = "adoption_request";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    /// Subject issued by the identity provider. Unique per user.
    pub external_id: String,
    pub email: String,
    pub name: String,
    pub profile_image: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub preferences: Option<Preferences>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Saved adoption criteria. Empty lists and `None` mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub pet_type: Vec<PetType>,
    pub size: Vec<PetSize>,
    pub age: Vec<AgeBracket>,
    pub activity_level: Option<ActivityLevel>,
    pub living_space: Option<LivingSpace>,
    pub experience: Option<Experience>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub age: u8,
    pub size: PetSize,
    pub gender: Gender,
    pub description: String,
    pub images: Vec<String>,
    pub is_available: bool,
    pub activity_level: ActivityLevel,
    pub good_with_kids: bool,
    pub good_with_pets: bool,
    pub is_house_trained: bool,
    #[serde(alias = "isCastrado")]
    pub is_neutered: bool,
    pub medical_info: Option<String>,
    pub adoption_fee: Option<f64>,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing fields supplied by the owner when a pet is created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPet {
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: PetType,
    pub breed: String,
    pub age: u8,
    pub size: PetSize,
    pub gender: Gender,
    pub description: String,
    pub images: Vec<String>,
    pub activity_level: ActivityLevel,
    pub good_with_kids: bool,
    pub good_with_pets: bool,
    pub is_house_trained: bool,
    #[serde(alias = "isCastrado")]
    pub is_neutered: bool,
    #[serde(default)]
    pub medical_info: Option<String>,
    #[serde(default)]
    pub adoption_fee: Option<f64>,
    pub location: String,
}

/// Partial update of a listing. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub pet_type: Option<PetType>,
    pub breed: Option<String>,
    pub age: Option<u8>,
    pub size: Option<PetSize>,
    pub gender: Option<Gender>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_available: Option<bool>,
    pub activity_level: Option<ActivityLevel>,
    pub good_with_kids: Option<bool>,
    pub good_with_pets: Option<bool>,
    pub is_house_trained: Option<bool>,
    #[serde(alias = "isCastrado")]
    pub is_neutered: Option<bool>,
    pub medical_info: Option<String>,
    pub adoption_fee: Option<f64>,
    pub location: Option<String>,
}

impl PetPatch {
    pub fn apply(self, pet: &mut Pet) {
        if let Some(v) = self.name {
            pet.name = v;
        }
        if let Some(v) = self.pet_type {
            pet.pet_type = v;
        }
        if let Some(v) = self.breed {
            pet.breed = v;
        }
        if let Some(v) = self.age {
            pet.age = v;
        }
        if let Some(v) = self.size {
            pet.size = v;
        }
        if let Some(v) = self.gender {
            pet.gender = v;
        }
        if let Some(v) = self.description {
            pet.description = v;
        }
        if let Some(v) = self.images {
            pet.images = v;
        }
        if let Some(v) = self.is_available {
            pet.is_available = v;
        }
        if let Some(v) = self.activity_level {
            pet.activity_level = v;
        }
        if let Some(v) = self.good_with_kids {
            pet.good_with_kids = v;
        }
        if let Some(v) = self.good_with_pets {
            pet.good_with_pets = v;
        }
        if let Some(v) = self.is_house_trained {
            pet.is_house_trained = v;
        }
        if let Some(v) = self.is_neutered {
            pet.is_neutered = v;
        }
        if let Some(v) = self.medical_info {
            pet.medical_info = Some(v);
        }
        if let Some(v) = self.adoption_fee {
            pet.adoption_fee = Some(v);
        }
        if let Some(v) = self.location {
            pet.location = v;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    pub experience: Experience,
    pub living_space: LivingSpace,
    pub other_pets: OtherPets,
    pub reason: String,
    #[serde(default)]
    pub references: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionApplication {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub applicant_id: Uuid,
    /// Owner of the pet when the application was submitted.
    pub owner_id: Uuid,
    pub status: ApplicationStatus,
    #[serde(rename = "applicationData")]
    pub details: ApplicationDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A chat line inside an application thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub application_id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Rows removed by a user deletion, per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub pets: usize,
    pub applications: usize,
    pub messages: usize,
    pub notifications: usize,
}
