/// Trips. Ownership is expressed through trip members, not a column here.
use super::models::{EntityKind, NewTrip, Trip, TripPatch, TripSearch};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::DbPool;
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, Row};

impl Record for Trip {
    const KIND: EntityKind = EntityKind::Trip;
    const COLUMNS: &'static str = "id_trip, name, start_date, end_date";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Trip {
            id_trip: row.get(0)?,
            name: row.get(1)?,
            start_date: row.get(2)?,
            end_date: row.get(3)?,
        })
    }
}

impl Keyed for Trip {
    const KEY: &'static str = "id_trip";
    const ID_PREFIX: &'static str = "TR";

    fn id(&self) -> &str {
        &self.id_trip
    }
}

selectors! {
    pub enum TripSelector for Trip {
        IdTrip => "idTrip", "id_trip = ?1", One;
        Name => "name", "name = ?1 ORDER BY rowid", Many;
    }
}

/// Trip storage operations
pub struct TripStore;

impl TripStore {
    fn check_dates(trip: &Trip) -> Result<()> {
        match trip.end_date {
            Some(end) if end < trip.start_date => Err(StoreError::Validation(format!(
                "trip ends ({end}) before it starts ({})",
                trip.start_date
            ))),
            _ => Ok(()),
        }
    }

    fn write(conn: &Connection, trip: &Trip, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO trips (id_trip, name, start_date, end_date) VALUES (?1, ?2, ?3, ?4)"
        } else {
            "UPDATE trips SET name = ?2, start_date = ?3, end_date = ?4 WHERE id_trip = ?1"
        };
        conn.execute(
            sql,
            params![trip.id_trip, trip.name, trip.start_date, trip.end_date],
        )?;
        Ok(())
    }

    /// Trips lying entirely inside the `from`..`to` window whose name
    /// contains `keyword` (case-insensitive). The window is ignored unless
    /// both bounds are given; an ongoing trip never lies inside one.
    pub async fn search(pool: &DbPool, filter: &TripSearch) -> Result<Vec<Trip>> {
        let keyword = filter.keyword.as_deref().filter(|k| !k.trim().is_empty());
        let (from, to) = match (filter.from, filter.to) {
            (Some(from), Some(to)) => (Some(from), Some(to)),
            _ => (None, None),
        };
        pool.with_connection(|conn| {
            record::select_where(
                conn,
                "(?1 IS NULL OR (start_date >= ?1 AND end_date <= ?2))
                 AND (?3 IS NULL OR instr(lower(name), lower(?3)) > 0)
                 ORDER BY start_date, rowid",
                params![from, to, keyword],
            )
        })
        .await
    }
}

impl Repository for TripStore {
    type Record = Trip;
    type New = NewTrip;
    type Patch = TripPatch;
    type Selector = TripSelector;

    async fn create(pool: &DbPool, input: &NewTrip) -> Result<Trip> {
        let trip = pool
            .with_transaction(|conn, ids| {
                let trip = Trip {
                    id_trip: ids.generate::<Trip>(conn)?,
                    name: input.name.clone(),
                    start_date: input.start_date,
                    end_date: input.end_date,
                };
                Self::check_dates(&trip)?;
                Self::write(conn, &trip, true)?;
                record::reload::<Trip>(conn, &trip.id_trip)
            })
            .await?;

        log::info!("Created trip {} ({})", trip.id_trip, trip.name);
        Ok(trip)
    }

    async fn update(pool: &DbPool, id: &str, patch: &TripPatch) -> Result<Trip> {
        pool.with_transaction(|conn, _| {
            let mut trip = record::reload::<Trip>(conn, id)?;
            patch.apply_to(&mut trip);
            Self::check_dates(&trip)?;
            Self::write(conn, &trip, false)?;
            log::debug!("Updated trip {}", id);
            Ok(trip)
        })
        .await
    }
}
