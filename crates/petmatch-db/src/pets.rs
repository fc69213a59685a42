use anyhow::Result;
use chrono::Utc;
use petmatch_query::PetSource;
use petmatch_types::models::{NewPet, Pet};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::info;
use uuid::Uuid;

use crate::Database;
use crate::models::{json, parsed, time, timestamp, to_json, uuid};

const PET_COLUMNS: &str = "id, owner_id, name, pet_type, breed, age, size, gender, description, \
                           images, is_available, activity_level, good_with_kids, good_with_pets, \
                           is_house_trained, is_neutered, medical_info, adoption_fee, location, \
                           created_at, updated_at";

fn pet_from_row(row: &Row<'_>) -> rusqlite::Result<Pet> {
    Ok(Pet {
        id: uuid(row, 0)?,
        owner_id: uuid(row, 1)?,
        name: row.get(2)?,
        pet_type: parsed(row, 3)?,
        breed: row.get(4)?,
        age: row.get(5)?,
        size: parsed(row, 6)?,
        gender: parsed(row, 7)?,
        description: row.get(8)?,
        images: json(row, 9)?,
        is_available: row.get(10)?,
        activity_level: parsed(row, 11)?,
        good_with_kids: row.get(12)?,
        good_with_pets: row.get(13)?,
        is_house_trained: row.get(14)?,
        is_neutered: row.get(15)?,
        medical_info: row.get(16)?,
        adoption_fee: row.get(17)?,
        location: row.get(18)?,
        created_at: time(row, 19)?,
        updated_at: time(row, 20)?,
    })
}

pub(crate) fn query_pet(conn: &Connection, id: Uuid) -> Result<Option<Pet>> {
    let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE id = ?1");
    let pet = conn.query_row(&sql, [id.to_string()], pet_from_row).optional()?;
    Ok(pet)
}

fn query_pets(conn: &Connection, filter: &str, value: Option<&str>) -> Result<Vec<Pet>> {
    // rowid order is insertion order
    let sql = format!("SELECT {PET_COLUMNS} FROM pets WHERE {filter} ORDER BY rowid");
    let mut stmt = conn.prepare(&sql)?;
    let rows = match value {
        Some(v) => stmt.query_map([v], pet_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
        None => stmt.query_map([], pet_from_row)?.collect::<rusqlite::Result<Vec<_>>>()?,
    };
    Ok(rows)
}

impl Database {
    /// Inserts a validated listing owned by `owner_id`. New pets are available.
    pub fn create_pet(&self, owner_id: Uuid, pet: NewPet) -> Result<Pet> {
        let id = Uuid::new_v4();
        let images = to_json(&pet.images)?;

        self.with_conn(|conn| {
            let now = timestamp(Utc::now());
            conn.execute(
                &format!(
                    "INSERT INTO pets ({PET_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?12, ?13, ?14, ?15,
                             ?16, ?17, ?18, ?19, ?19)"
                ),
                params![
                    id.to_string(),
                    owner_id.to_string(),
                    pet.name,
                    pet.pet_type.as_str(),
                    pet.breed,
                    pet.age,
                    pet.size.as_str(),
                    pet.gender.as_str(),
                    pet.description,
                    images,
                    pet.activity_level.as_str(),
                    pet.good_with_kids,
                    pet.good_with_pets,
                    pet.is_house_trained,
                    pet.is_neutered,
                    pet.medical_info,
                    pet.adoption_fee,
                    pet.location,
                    now,
                ],
            )?;
            info!("Pet {} ({}) listed by {}", id, pet.name, owner_id);

            query_pet(conn, id)?.ok_or_else(|| anyhow::anyhow!("Pet vanished after insert: {}", id))
        })
    }

    pub fn get_pet(&self, id: Uuid) -> Result<Option<Pet>> {
        self.with_conn(|conn| query_pet(conn, id))
    }

    /// Every listing of `owner_id`, available or not, in insertion order.
    pub fn get_pets_by_owner(&self, owner_id: Uuid) -> Result<Vec<Pet>> {
        self.with_conn(|conn| query_pets(conn, "owner_id = ?1", Some(&owner_id.to_string())))
    }

    /// Writes every mutable field of `pet` back and bumps `updated_at`.
    pub fn save_pet(&self, pet: &Pet) -> Result<Option<Pet>> {
        let images = to_json(&pet.images)?;

        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE pets SET
                    name = ?2, pet_type = ?3, breed = ?4, age = ?5, size = ?6, gender = ?7,
                    description = ?8, images = ?9, is_available = ?10, activity_level = ?11,
                    good_with_kids = ?12, good_with_pets = ?13, is_house_trained = ?14,
                    is_neutered = ?15, medical_info = ?16, adoption_fee = ?17, location = ?18,
                    updated_at = ?19
                 WHERE id = ?1",
                params![
                    pet.id.to_string(),
                    pet.name,
                    pet.pet_type.as_str(),
                    pet.breed,
                    pet.age,
                    pet.size.as_str(),
                    pet.gender.as_str(),
                    pet.description,
                    images,
                    pet.is_available,
                    pet.activity_level.as_str(),
                    pet.good_with_kids,
                    pet.good_with_pets,
                    pet.is_house_trained,
                    pet.is_neutered,
                    pet.medical_info,
                    pet.adoption_fee,
                    pet.location,
                    timestamp(Utc::now()),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_pet(conn, pet.id)
        })
    }

    /// Hard-deletes a pet. Its applications and their messages go with it, as
    /// do notifications about those applications.
    pub fn delete_pet(&self, id: Uuid) -> Result<bool> {
        let id = id.to_string();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM notifications
                 WHERE related_id IN (SELECT id FROM adoption_applications WHERE pet_id = ?1)",
                [&id],
            )?;
            let deleted = tx.execute("DELETE FROM pets WHERE id = ?1", [&id])?;
            tx.commit()?;

            if deleted > 0 {
                info!("Pet {} deleted", id);
            }
            Ok(deleted > 0)
        })
    }
}

impl PetSource for Database {
    fn available_pets(&self) -> Result<Vec<Pet>> {
        self.with_conn(|conn| query_pets(conn, "is_available = 1", None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;
    use petmatch_types::attributes::{PetSize, PetType};
    use petmatch_types::models::PetPatch;

    #[test]
    fn created_pet_round_trips_through_store() {
        let db = Database::open_in_memory().unwrap();
        let owner = fixtures::user(&db, "idp|owner");

        let mut listing = fixtures::new_pet("Rex", PetType::Dog, 3);
        listing.images.push("https://img.example/rex-2.jpg".into());
        listing.adoption_fee = Some(80.5);
        listing.medical_info = Some("vaccinated".into());
        let created = db.create_pet(owner.id, listing.clone()).unwrap();

        assert!(created.is_available);
        assert_eq!(created.owner_id, owner.id);
        assert_eq!(created.pet_type, PetType::Dog);
        assert_eq!(created.images, listing.images);
        assert_eq!(created.adoption_fee, Some(80.5));
        assert_eq!(db.get_pet(created.id).unwrap(), Some(created));
    }

    #[test]
    fn available_pets_skip_unavailable_and_keep_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let owner = fixtures::user(&db, "idp|owner");
        let a = db.create_pet(owner.id, fixtures::new_pet("A", PetType::Dog, 1)).unwrap();
        let mut b = db.create_pet(owner.id, fixtures::new_pet("B", PetType::Cat, 2)).unwrap();
        db.create_pet(owner.id, fixtures::new_pet("C", PetType::Bird, 3)).unwrap();

        // touching A must not move it
        db.save_pet(&a).unwrap();
        b.is_available = false;
        db.save_pet(&b).unwrap();

        let names: Vec<_> = db.available_pets().unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["A", "C"]);
        assert_eq!(db.get_pets_by_owner(owner.id).unwrap().len(), 3);
    }

    #[test]
    fn patch_and_save() {
        let db = Database::open_in_memory().unwrap();
        let owner = fixtures::user(&db, "idp|owner");
        let mut pet = db.create_pet(owner.id, fixtures::new_pet("Rex", PetType::Dog, 3)).unwrap();

        PetPatch {
            size: Some(PetSize::Large),
            is_neutered: Some(false),
            ..Default::default()
        }
        .apply(&mut pet);
        let saved = db.save_pet(&pet).unwrap().unwrap();

        assert_eq!(saved.size, PetSize::Large);
        assert!(!saved.is_neutered);
        assert_eq!(saved.name, "Rex");
        assert!(saved.updated_at >= saved.created_at);
    }

    #[test]
    fn delete_pet_reports_whether_it_existed() {
        let db = Database::open_in_memory().unwrap();
        let owner = fixtures::user(&db, "idp|owner");
        let pet = db.create_pet(owner.id, fixtures::new_pet("Rex", PetType::Dog, 3)).unwrap();

        assert!(db.delete_pet(pet.id).unwrap());
        assert!(!db.delete_pet(pet.id).unwrap());
        assert!(db.get_pet(pet.id).unwrap().is_none());
    }
}
