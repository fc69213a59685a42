use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                external_id     TEXT NOT NULL UNIQUE,
                email           TEXT NOT NULL,
                name            TEXT NOT NULL,
                profile_image   TEXT,
                bio             TEXT,
                location        TEXT,
                phone           TEXT,
                preferences     TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE pets (
                id                  TEXT PRIMARY KEY,
                owner_id            TEXT NOT NULL REFERENCES users(id),
                name                TEXT NOT NULL,
                pet_type            TEXT NOT NULL,
                breed               TEXT NOT NULL,
                age                 INTEGER NOT NULL CHECK (age BETWEEN 0 AND 30),
                size                TEXT NOT NULL,
                gender              TEXT NOT NULL,
                description         TEXT NOT NULL,
                images              TEXT NOT NULL,
                is_available        INTEGER NOT NULL DEFAULT 1,
                activity_level      TEXT NOT NULL,
                good_with_kids      INTEGER NOT NULL,
                good_with_pets      INTEGER NOT NULL,
                is_house_trained    INTEGER NOT NULL,
                is_neutered         INTEGER NOT NULL,
                medical_info        TEXT,
                adoption_fee        REAL CHECK (adoption_fee IS NULL OR adoption_fee >= 0),
                location            TEXT NOT NULL,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_pets_available ON pets(is_available);
            CREATE INDEX idx_pets_owner ON pets(owner_id);

            CREATE TABLE adoption_applications (
                id              TEXT PRIMARY KEY,
                pet_id          TEXT NOT NULL REFERENCES pets(id) ON DELETE CASCADE,
                applicant_id    TEXT NOT NULL REFERENCES users(id),
                owner_id        TEXT NOT NULL REFERENCES users(id),
                status          TEXT NOT NULL DEFAULT 'pending',
                details         TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                UNIQUE(pet_id, applicant_id)
            );

            CREATE INDEX idx_applications_applicant ON adoption_applications(applicant_id);
            CREATE INDEX idx_applications_owner ON adoption_applications(owner_id);

            CREATE TABLE messages (
                id              TEXT PRIMARY KEY,
                application_id  TEXT NOT NULL REFERENCES adoption_applications(id) ON DELETE CASCADE,
                sender_id       TEXT NOT NULL REFERENCES users(id),
                receiver_id     TEXT NOT NULL REFERENCES users(id),
                content         TEXT NOT NULL,
                created_at      TEXT NOT NULL
            );

            CREATE INDEX idx_messages_application ON messages(application_id, created_at);
            CREATE INDEX idx_messages_sender ON messages(sender_id);
            CREATE INDEX idx_messages_receiver ON messages(receiver_id);

            CREATE TABLE notifications (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL REFERENCES users(id),
                kind        TEXT NOT NULL,
                title       TEXT NOT NULL,
                message     TEXT NOT NULL,
                is_read     INTEGER NOT NULL DEFAULT 0,
                related_id  TEXT,
                created_at  TEXT NOT NULL
            );

            CREATE INDEX idx_notifications_user ON notifications(user_id, is_read);
            CREATE INDEX idx_notifications_related ON notifications(related_id);

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
