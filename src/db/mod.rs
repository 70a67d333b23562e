//! Database layer for persistent storage.
//! Owns the SQLite connection and the building blocks every entity store is
//! composed from: identifier generation, selector lookup and referential
//! validation.

pub mod ai_recommendation_store;
pub mod booking_store;
pub mod detail_store;
pub mod friend_store;
pub mod ids;
pub mod init;
pub mod models;
pub mod notification_store;
pub mod place_store;
pub mod record;
pub mod repository;
pub mod review_store;
pub mod selector;
pub mod trip_member_store;
pub mod trip_store;
pub mod user_store;
pub mod validate;

pub use ai_recommendation_store::AiRecommendationStore;
pub use booking_store::BookingStore;
pub use detail_store::DetailStore;
pub use friend_store::FriendStore;
pub use ids::IdGenerator;
pub use notification_store::NotificationStore;
pub use place_store::PlaceStore;
pub use repository::Repository;
pub use review_store::ReviewStore;
pub use selector::Lookup;
pub use trip_member_store::TripMemberStore;
pub use trip_store::TripStore;
pub use user_store::UserStore;

use crate::error::Result;
use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handle to the single SQLite connection plus identifier settings.
///
/// Every store operation holds the connection for its whole duration, so a
/// check-then-write sequence is never interleaved with another request.
#[derive(Clone)]
pub struct DbPool {
    conn: Arc<Mutex<Connection>>,
    ids: IdGenerator,
}

impl DbPool {
    fn new(conn: Connection, ids: IdGenerator) -> Self {
        DbPool {
            conn: Arc::new(Mutex::new(conn)),
            ids,
        }
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    /// Run a read-only closure against the connection
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().await;
        f(&*conn)
    }

    /// Run a closure inside one transaction.
    ///
    /// Commits when the closure returns `Ok`; on `Err` the transaction is
    /// dropped and rolled back, and the connection lock is released either way.
    pub async fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, &IdGenerator) -> Result<T>,
    {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        let value = f(&*tx, &self.ids)?;
        tx.commit()?;
        Ok(value)
    }
}

/// Open (or create) the database file and initialise the schema
pub fn create_pool(db_path: impl AsRef<Path>, max_id_attempts: u32) -> SqliteResult<DbPool> {
    let conn = Connection::open(db_path)?;
    init::initialize_database(&conn)?;
    Ok(DbPool::new(conn, IdGenerator::new(max_id_attempts)))
}

/// Create an in-memory database for testing
pub fn create_test_pool() -> DbPool {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory DB");
    init::initialize_database(&conn).expect("Failed to initialize DB");
    DbPool::new(conn, IdGenerator::default())
}
