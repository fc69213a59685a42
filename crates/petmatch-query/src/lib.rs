//! Pet Query Engine.
//!
//! Answers the three listing queries (all available pets, search with
//! filters, recommendations) over one snapshot of available pets taken from a
//! [`PetSource`]. Everything after that single read is in-memory filtering.
//! Store errors are returned unchanged.

pub mod filter;
pub mod recommend;

use std::sync::Arc;

use anyhow::Result;
use petmatch_types::models::{Pet, Preferences};
use tracing::debug;
use uuid::Uuid;

pub use filter::{PetFilters, filter_pets, matches_search};
pub use recommend::{RECOMMENDATION_LIMIT, matches_preferences, recommend};

/// Read access to the pet collection.
pub trait PetSource {
    /// Every pet with `is_available == true`, in store insertion order.
    fn available_pets(&self) -> Result<Vec<Pet>>;
}

impl<S: PetSource + ?Sized> PetSource for &S {
    fn available_pets(&self) -> Result<Vec<Pet>> {
        (**self).available_pets()
    }
}

impl<S: PetSource + ?Sized> PetSource for Arc<S> {
    fn available_pets(&self) -> Result<Vec<Pet>> {
        (**self).available_pets()
    }
}

pub struct PetQueryEngine<S> {
    store: S,
}

impl<S: PetSource> PetQueryEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn all_pets(&self) -> Result<Vec<Pet>> {
        self.store.available_pets()
    }

    pub fn filtered_pets(&self, search: &str, filters: &PetFilters) -> Result<Vec<Pet>> {
        let pets = self.store.available_pets()?;
        let total = pets.len();
        let pets = filter_pets(pets, search, filters);
        debug!(total, matched = pets.len(), "filtered pets");
        Ok(pets)
    }

    pub fn recommended_pets(
        &self,
        user_id: Uuid,
        preferences: Option<&Preferences>,
    ) -> Result<Vec<Pet>> {
        let pets = self.store.available_pets()?;
        Ok(recommend(pets, user_id, preferences))
    }
}
