/// Database schema initialization.
/// Sets up SQLite WAL mode and creates tables on startup.
///
/// Foreign keys are declared for documentation and tooling but not enforced:
/// references are checked by the stores before each write, and deleting a
/// row never cascades to or is blocked by its dependents.
use rusqlite::{Connection, Result as SqliteResult};

/// Initialize database connection with WAL mode and schema
pub fn initialize_database(conn: &Connection) -> SqliteResult<()> {
    // In-memory databases stay in "memory" mode
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    log::debug!("SQLite journal mode: {}", mode);
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", false)?;

    create_schema(conn)?;

    Ok(())
}

/// Create all database tables
fn create_schema(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id_user TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL,
            gender INTEGER,
            email TEXT UNIQUE,
            phone TEXT UNIQUE,
            avatar BLOB,
            theme INTEGER NOT NULL DEFAULT 0,
            language INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS trips (
            id_trip TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT
        );

        CREATE TABLE IF NOT EXISTS places (
            id_place TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            country TEXT NOT NULL,
            city TEXT NOT NULL,
            province TEXT,
            address TEXT NOT NULL,
            description TEXT,
            image TEXT,
            rating INTEGER NOT NULL,
            place_type INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS bookings (
            id_booking TEXT PRIMARY KEY NOT NULL,
            id_user TEXT NOT NULL,
            id_place TEXT NOT NULL,
            date TEXT NOT NULL,
            status INTEGER NOT NULL DEFAULT 0 CHECK (status IN (0, 1, 2)),
            FOREIGN KEY(id_user) REFERENCES users(id_user),
            FOREIGN KEY(id_place) REFERENCES places(id_place)
        );

        CREATE TABLE IF NOT EXISTS reviews (
            id_review TEXT PRIMARY KEY NOT NULL,
            id_trip TEXT NOT NULL,
            id_user TEXT NOT NULL,
            comment TEXT,
            rating INTEGER NOT NULL,
            FOREIGN KEY(id_trip) REFERENCES trips(id_trip),
            FOREIGN KEY(id_user) REFERENCES users(id_user)
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id_notify TEXT PRIMARY KEY NOT NULL,
            id_user TEXT NOT NULL,
            content TEXT NOT NULL,
            is_read INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(id_user) REFERENCES users(id_user)
        );

        CREATE TABLE IF NOT EXISTS friends (
            id_self TEXT NOT NULL,
            id_friend TEXT NOT NULL,
            is_accept INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (id_self, id_friend),
            CHECK (id_self <> id_friend),
            FOREIGN KEY(id_self) REFERENCES users(id_user),
            FOREIGN KEY(id_friend) REFERENCES users(id_user)
        );

        CREATE UNIQUE INDEX IF NOT EXISTS friends_unordered_pair
            ON friends(min(id_self, id_friend), max(id_self, id_friend));

        CREATE TABLE IF NOT EXISTS trip_members (
            id_user TEXT NOT NULL,
            id_trip TEXT NOT NULL,
            PRIMARY KEY (id_user, id_trip),
            FOREIGN KEY(id_user) REFERENCES users(id_user),
            FOREIGN KEY(id_trip) REFERENCES trips(id_trip)
        );

        CREATE TABLE IF NOT EXISTS ai_recommendations (
            id_ai_rec TEXT PRIMARY KEY NOT NULL,
            id_user TEXT NOT NULL,
            input TEXT NOT NULL,
            output TEXT,
            FOREIGN KEY(id_user) REFERENCES users(id_user)
        );

        CREATE TABLE IF NOT EXISTS details (
            id_detail TEXT PRIMARY KEY NOT NULL,
            id_trip TEXT NOT NULL,
            id_place TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            note TEXT,
            FOREIGN KEY(id_trip) REFERENCES trips(id_trip),
            FOREIGN KEY(id_place) REFERENCES places(id_place)
        );

        CREATE INDEX IF NOT EXISTS idx_bookings_user ON bookings(id_user);
        CREATE INDEX IF NOT EXISTS idx_bookings_place ON bookings(id_place);
        CREATE INDEX IF NOT EXISTS idx_reviews_trip ON reviews(id_trip, rating);
        CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(id_user, is_read);
        CREATE INDEX IF NOT EXISTS idx_friends_friend ON friends(id_friend);
        CREATE INDEX IF NOT EXISTS idx_trip_members_trip ON trip_members(id_trip);
        CREATE INDEX IF NOT EXISTS idx_ai_recommendations_user ON ai_recommendations(id_user);
        CREATE INDEX IF NOT EXISTS idx_details_trip ON details(id_trip, start_time);
        CREATE INDEX IF NOT EXISTS idx_details_place ON details(id_place);
        "#,
    )?;

    Ok(())
}
