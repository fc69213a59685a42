use petmatch_types::attributes::{ActivityLevel, AgeBracket, Gender, PetSize, PetType};
use petmatch_types::models::Pet;

/// Discrete search filters. `None` means "no constraint" for that field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilters {
    pub pet_type: Option<PetType>,
    pub breed: Option<String>,
    pub size: Option<PetSize>,
    pub age: Option<AgeBracket>,
    pub gender: Option<Gender>,
    pub activity_level: Option<ActivityLevel>,
    pub good_with_kids: Option<bool>,
    pub good_with_pets: Option<bool>,
    pub is_house_trained: Option<bool>,
    pub is_neutered: Option<bool>,
    /// Case-insensitive substring of the pet's location.
    pub location: Option<String>,
}

impl PetFilters {
    pub fn is_empty(&self) -> bool {
        *self == PetFilters::default()
    }

    pub fn matches(&self, pet: &Pet) -> bool {
        fn eq<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().is_none_or(|w| w == actual)
        }

        eq(&self.pet_type, &pet.pet_type)
            && self.breed.as_ref().is_none_or(|b| *b == pet.breed)
            && eq(&self.size, &pet.size)
            && eq(&self.gender, &pet.gender)
            && eq(&self.activity_level, &pet.activity_level)
            && eq(&self.good_with_kids, &pet.good_with_kids)
            && eq(&self.good_with_pets, &pet.good_with_pets)
            && eq(&self.is_house_trained, &pet.is_house_trained)
            && eq(&self.is_neutered, &pet.is_neutered)
            && self
                .location
                .as_ref()
                .is_none_or(|loc| pet.location.to_lowercase().contains(&loc.to_lowercase()))
            && self.age.is_none_or(|bracket| bracket.contains(pet.age))
    }
}

/// Case-insensitive substring match against name, breed, description or type.
/// Only the empty term matches every pet. Whitespace is part of the term.
pub fn matches_search(pet: &Pet, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();

    pet.name.to_lowercase().contains(&needle)
        || pet.breed.to_lowercase().contains(&needle)
        || pet.description.to_lowercase().contains(&needle)
        || pet.pet_type.as_str().contains(&needle)
        || pet.pet_type.label().contains(&needle)
}

/// Keeps the pets that match `search` and every filter, preserving order.
pub fn filter_pets(pets: Vec<Pet>, search: &str, filters: &PetFilters) -> Vec<Pet> {
    pets.into_iter()
        .filter(|pet| matches_search(pet, search) && filters.matches(pet))
        .collect()
}
