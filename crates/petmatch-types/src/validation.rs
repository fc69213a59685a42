use thiserror::Error;

use crate::models::{ApplicationDetails, NewPet, Pet};

pub const MAX_PET_AGE: u8 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("at least one image is required")]
    NoImages,

    #[error("age must be between 0 and 30, got {0}")]
    AgeOutOfRange(u8),

    #[error("adoption fee must be a non-negative amount")]
    InvalidAdoptionFee,
}

struct Listing<'a> {
    name: &'a str,
    breed: &'a str,
    description: &'a str,
    location: &'a str,
    images: &'a [String],
    age: u8,
    adoption_fee: Option<f64>,
}

impl Listing<'_> {
    fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("name", self.name),
            ("breed", self.breed),
            ("description", self.description),
            ("location", self.location),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(field));
            }
        }
        if !self.images.iter().any(|url| !url.trim().is_empty()) {
            return Err(ValidationError::NoImages);
        }
        if self.age > MAX_PET_AGE {
            return Err(ValidationError::AgeOutOfRange(self.age));
        }
        if let Some(fee) = self.adoption_fee {
            if !fee.is_finite() || fee < 0.0 {
                return Err(ValidationError::InvalidAdoptionFee);
            }
        }
        Ok(())
    }
}

impl NewPet {
    pub fn validate(&self) -> Result<(), ValidationError> {
        Listing {
            name: &self.name,
            breed: &self.breed,
            description: &self.description,
            location: &self.location,
            images: &self.images,
            age: self.age,
            adoption_fee: self.adoption_fee,
        }
        .validate()
    }
}

impl Pet {
    /// Re-checks a stored listing after a partial update has been applied.
    pub fn validate(&self) -> Result<(), ValidationError> {
        Listing {
            name: &self.name,
            breed: &self.breed,
            description: &self.description,
            location: &self.location,
            images: &self.images,
            age: self.age,
            adoption_fee: self.adoption_fee,
        }
        .validate()
    }
}

impl ApplicationDetails {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.reason.trim().is_empty() {
            return Err(ValidationError::MissingField("reason"));
        }
        Ok(())
    }
}
