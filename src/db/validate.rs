/// Referential and uniqueness checks run before a write.
///
/// These are plain reads; callers run them inside the same transaction as
/// the dependent insert or update.
use super::models::EntityKind;
use super::record::{self, Keyed};
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection};

/// Resolve a foreign identifier or fail with `NotFound`
pub fn require_exists<T: Keyed>(conn: &Connection, id: &str) -> Result<T> {
    record::fetch::<T>(conn, id)?.ok_or_else(|| {
        log::debug!("Dangling {} reference: {}", T::KIND, id);
        StoreError::not_found(T::KIND, id)
    })
}

/// Reject a relation whose two ends are the same user
pub fn require_distinct(id_self: &str, id_other: &str) -> Result<()> {
    if id_self == id_other {
        return Err(StoreError::SelfReference {
            id: id_self.to_string(),
        });
    }
    Ok(())
}

/// Fail with `DuplicateValue` if another row of `T` already holds `value`
/// in `column`. `exclude_id` skips the row being updated.
pub fn require_unique<T: Keyed>(
    conn: &Connection,
    column: &'static str,
    field: &str,
    value: &str,
    exclude_id: Option<&str>,
) -> Result<()> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1 AND {} IS NOT ?2)",
        T::KIND.table(),
        column,
        T::KEY
    );
    let taken: bool = conn.query_row(&sql, params![value, exclude_id], |row| row.get(0))?;
    if taken {
        return Err(duplicate(T::KIND, field));
    }
    Ok(())
}

pub fn duplicate(kind: EntityKind, field: &str) -> StoreError {
    StoreError::DuplicateValue {
        kind,
        field: field.to_string(),
    }
}
