/// Itinerary entries: which place a trip visits and when.
use super::models::{Detail, DetailPatch, EntityKind, NewDetail, Page, Place, Trip, MAX_PAGE_LIMIT};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::validate;
use super::DbPool;
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, Row};

impl Record for Detail {
    const KIND: EntityKind = EntityKind::Detail;
    const COLUMNS: &'static str = "id_detail, id_trip, id_place, start_time, end_time, note";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Detail {
            id_detail: row.get(0)?,
            id_trip: row.get(1)?,
            id_place: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
            note: row.get(5)?,
        })
    }
}

impl Keyed for Detail {
    const KEY: &'static str = "id_detail";
    const ID_PREFIX: &'static str = "DT";

    fn id(&self) -> &str {
        &self.id_detail
    }
}

selectors! {
    pub enum DetailSelector for Detail {
        IdDetail => "idDetail", "id_detail = ?1", One;
        IdTrip => "idTrip", "id_trip = ?1 ORDER BY start_time, rowid", Many;
        IdPlace => "idPlace", "id_place = ?1 ORDER BY start_time, rowid", Many;
    }
}

/// Itinerary storage operations
pub struct DetailStore;

impl DetailStore {
    fn check_times(detail: &Detail) -> Result<()> {
        if detail.end_time < detail.start_time {
            return Err(StoreError::Validation(format!(
                "visit ends ({}) before it starts ({})",
                detail.end_time, detail.start_time
            )));
        }
        Ok(())
    }

    fn write(conn: &Connection, detail: &Detail, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO details (id_detail, id_trip, id_place, start_time, end_time, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        } else {
            "UPDATE details SET id_trip = ?2, id_place = ?3, start_time = ?4, end_time = ?5, note = ?6
             WHERE id_detail = ?1"
        };
        conn.execute(
            sql,
            params![
                detail.id_detail,
                detail.id_trip,
                detail.id_place,
                detail.start_time,
                detail.end_time,
                detail.note,
            ],
        )?;
        Ok(())
    }

    fn page_where(conn: &Connection, filter: &str, id: &str, page: Page) -> Result<Vec<Detail>> {
        record::select_where(
            conn,
            filter,
            params![id, page.limit.min(MAX_PAGE_LIMIT), page.skip],
        )
    }

    /// The itinerary of one trip in visiting order
    pub async fn for_trip(pool: &DbPool, id_trip: &str, page: Page) -> Result<Vec<Detail>> {
        pool.with_connection(|conn| {
            Self::page_where(
                conn,
                "id_trip = ?1 ORDER BY start_time, rowid LIMIT ?2 OFFSET ?3",
                id_trip,
                page,
            )
        })
        .await
    }

    /// Every scheduled visit to one place
    pub async fn for_place(pool: &DbPool, id_place: &str, page: Page) -> Result<Vec<Detail>> {
        pool.with_connection(|conn| {
            Self::page_where(
                conn,
                "id_place = ?1 ORDER BY start_time, rowid LIMIT ?2 OFFSET ?3",
                id_place,
                page,
            )
        })
        .await
    }
}

impl Repository for DetailStore {
    type Record = Detail;
    type New = NewDetail;
    type Patch = DetailPatch;
    type Selector = DetailSelector;

    async fn create(pool: &DbPool, input: &NewDetail) -> Result<Detail> {
        let detail = pool
            .with_transaction(|conn, ids| {
                validate::require_exists::<Trip>(conn, &input.id_trip)?;
                validate::require_exists::<Place>(conn, &input.id_place)?;

                let detail = Detail {
                    id_detail: ids.generate::<Detail>(conn)?,
                    id_trip: input.id_trip.clone(),
                    id_place: input.id_place.clone(),
                    start_time: input.start_time,
                    end_time: input.end_time,
                    note: input.note.clone(),
                };
                Self::check_times(&detail)?;
                Self::write(conn, &detail, true)?;
                record::reload::<Detail>(conn, &detail.id_detail)
            })
            .await?;

        log::info!(
            "Created itinerary entry {} of trip {} at {}",
            detail.id_detail,
            detail.id_trip,
            detail.id_place
        );
        Ok(detail)
    }

    async fn update(pool: &DbPool, id: &str, patch: &DetailPatch) -> Result<Detail> {
        pool.with_transaction(|conn, _| {
            let mut detail = record::reload::<Detail>(conn, id)?;
            patch.apply_to(&mut detail);
            Self::check_times(&detail)?;
            Self::write(conn, &detail, false)?;
            log::debug!("Updated itinerary entry {}", id);
            Ok(detail)
        })
        .await
    }
}
