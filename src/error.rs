/// Error types for the trip planner data layer.
/// Every repository operation fails with one of these kinds.
use crate::db::models::{BookingStatus, EntityKind};
use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} with this {field} already exists")]
    DuplicateValue { kind: EntityKind, field: String },

    #[error("Cannot add yourself as a friend: {id}")]
    SelfReference { id: String },

    #[error("Invalid selector for {kind}: {field}")]
    InvalidSelector { kind: EntityKind, field: String },

    #[error("No free {kind} identifier after {attempts} attempts")]
    IdentifierExhaustion { kind: EntityKind, attempts: u32 },

    #[error("Booking status cannot change from {from} to {to}")]
    InvalidStatusTransition { from: BookingStatus, to: BookingStatus },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for failures caused by the store itself rather than the request.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            StoreError::Database(_) | StoreError::IdentifierExhaustion { .. }
        )
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Unique and primary key violations that get past the application
        // checks still surface as duplicates.
        if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
            if failure.code == ErrorCode::ConstraintViolation {
                if let Some(columns) = message.strip_prefix("UNIQUE constraint failed: ") {
                    if let Some(kind) = EntityKind::from_constraint_target(columns) {
                        return StoreError::DuplicateValue {
                            kind,
                            field: columns.to_string(),
                        };
                    }
                }
            }
        }
        StoreError::Database(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_error_display() {
        let err = StoreError::not_found(EntityKind::Place, "PL9999");
        assert_eq!(err.to_string(), "Place not found: PL9999");
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate() {
        let conn = Connection::open_in_memory().expect("Failed to open in-memory DB");
        conn.execute_batch("CREATE TABLE users (id_user TEXT PRIMARY KEY, username TEXT UNIQUE);")
            .expect("Failed to create table");
        conn.execute("INSERT INTO users VALUES ('US0001', 'ann1')", [])
            .expect("Failed to insert");

        let err: StoreError = conn
            .execute("INSERT INTO users VALUES ('US0002', 'ann1')", [])
            .expect_err("Duplicate insert should fail")
            .into();

        match err {
            StoreError::DuplicateValue { kind, field } => {
                assert_eq!(kind, EntityKind::User);
                assert_eq!(field, "users.username");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_other_errors_stay_database_errors() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StoreError::Database(_)));
        assert!(err.is_internal());
    }
}
