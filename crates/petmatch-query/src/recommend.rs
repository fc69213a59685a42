use petmatch_types::models::{Pet, Preferences};
use uuid::Uuid;

/// Upper bound on the number of recommendations returned.
pub const RECOMMENDATION_LIMIT: usize = 12;

/// Whether `pet` satisfies every constraint set in `prefs`.
pub fn matches_preferences(prefs: &Preferences, pet: &Pet) -> bool {
    (prefs.pet_type.is_empty() || prefs.pet_type.contains(&pet.pet_type))
        && (prefs.size.is_empty() || prefs.size.contains(&pet.size))
        && prefs.activity_level.is_none_or(|level| level == pet.activity_level)
        && (prefs.age.is_empty() || prefs.age.iter().any(|b| b.contains(pet.age)))
}

/// Picks pets for `user_id` out of a snapshot of available pets.
///
/// Pets owned by the user are never returned. Without preferences the first
/// [`RECOMMENDATION_LIMIT`] remaining pets come back in snapshot order. With
/// preferences, if nothing matches, every filter is dropped and the unfiltered
/// remainder is used instead. Living space and experience are not matched
/// against pets.
pub fn recommend(pets: Vec<Pet>, user_id: Uuid, preferences: Option<&Preferences>) -> Vec<Pet> {
    let candidates: Vec<Pet> = pets.into_iter().filter(|pet| pet.owner_id != user_id).collect();

    let Some(prefs) = preferences else {
        return truncate(candidates);
    };

    if !candidates.iter().any(|pet| matches_preferences(prefs, pet)) {
        tracing::debug!(%user_id, "no pets match saved preferences, falling back");
        return truncate(candidates);
    }

    truncate(
        candidates
            .into_iter()
            .filter(|pet| matches_preferences(prefs, pet))
            .collect(),
    )
}

fn truncate(mut pets: Vec<Pet>) -> Vec<Pet> {
    pets.truncate(RECOMMENDATION_LIMIT);
    pets
}
