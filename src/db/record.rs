/// Row mapping shared by every table.
///
/// SQL text assembled here only ever combines `&'static str` fragments
/// declared next to each record type; request values are always bound as
/// parameters.
use super::models::{EntityKind, Page, MAX_PAGE_LIMIT};
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, OptionalExtension, Params, Row};

/// A record stored in its own table
pub trait Record: Sized {
    const KIND: EntityKind;
    /// Comma separated column list in `from_row` order
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// A record keyed by a single generated identifier
pub trait Keyed: Record {
    const KEY: &'static str;
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
}

/// Select rows matching a static filter such as `id_user = ?1 ORDER BY rowid`
pub fn select_where<T: Record>(
    conn: &Connection,
    filter: &str,
    params: impl Params,
) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {}",
        T::COLUMNS,
        T::KIND.table(),
        filter
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Select at most one row matching a static filter
pub fn select_one_where<T: Record>(
    conn: &Connection,
    filter: &str,
    params: impl Params,
) -> Result<Option<T>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE {} LIMIT 1",
        T::COLUMNS,
        T::KIND.table(),
        filter
    );
    let row = conn.query_row(&sql, params, T::from_row).optional()?;
    Ok(row)
}

/// Fetch a record by its primary key
pub fn fetch<T: Keyed>(conn: &Connection, id: &str) -> Result<Option<T>> {
    select_one_where(conn, &format!("{} = ?1", T::KEY), params![id])
}

/// Fetch a record that must exist, e.g. right after inserting it
pub fn reload<T: Keyed>(conn: &Connection, id: &str) -> Result<T> {
    fetch::<T>(conn, id)?.ok_or_else(|| StoreError::not_found(T::KIND, id))
}

/// Existence check used by the id generator and validator
pub fn exists<T: Keyed>(conn: &Connection, id: &str) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1)",
        T::KIND.table(),
        T::KEY
    );
    let found: bool = conn.query_row(&sql, params![id], |row| row.get(0))?;
    Ok(found)
}

/// One page of records in insertion order
pub fn list<T: Record>(conn: &Connection, page: Page) -> Result<Vec<T>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY rowid LIMIT ?1 OFFSET ?2",
        T::COLUMNS,
        T::KIND.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![page.limit.min(MAX_PAGE_LIMIT), page.skip], T::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Delete a record by key, returning the removed row.
/// Dependents referencing it are left in place.
pub fn remove<T: Keyed>(conn: &Connection, id: &str) -> Result<T> {
    let record = reload::<T>(conn, id)?;
    let sql = format!("DELETE FROM {} WHERE {} = ?1", T::KIND.table(), T::KEY);
    conn.execute(&sql, params![id])?;
    log::debug!("Deleted {} {}", T::KIND, id);
    Ok(record)
}
