/// Places that can be booked and browsed.
use super::models::{EntityKind, NewPlace, Place, PlacePatch, PlaceSearch};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::DbPool;
use crate::error::Result;
use rusqlite::{params, Connection, Row};

impl Record for Place {
    const KIND: EntityKind = EntityKind::Place;
    const COLUMNS: &'static str =
        "id_place, name, country, city, province, address, description, image, rating, place_type";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Place {
            id_place: row.get(0)?,
            name: row.get(1)?,
            country: row.get(2)?,
            city: row.get(3)?,
            province: row.get(4)?,
            address: row.get(5)?,
            description: row.get(6)?,
            image: row.get(7)?,
            rating: row.get(8)?,
            place_type: row.get(9)?,
        })
    }
}

impl Keyed for Place {
    const KEY: &'static str = "id_place";
    const ID_PREFIX: &'static str = "PL";

    fn id(&self) -> &str {
        &self.id_place
    }
}

selectors! {
    pub enum PlaceSelector for Place {
        IdPlace => "idPlace", "id_place = ?1", One;
        Name => "name", "name = ?1 ORDER BY rowid", Many;
        Country => "country", "country = ?1 ORDER BY rowid", Many;
        City => "city", "city = ?1 ORDER BY rowid", Many;
        Province => "province", "province = ?1 ORDER BY rowid", Many;
        Type => "type", "place_type = ?1 ORDER BY rowid", Many;
        Rating => "rating", "rating = ?1 ORDER BY rowid", Many;
    }
}

/// Place storage operations
pub struct PlaceStore;

impl PlaceStore {
    fn write(conn: &Connection, place: &Place, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO places (id_place, name, country, city, province, address, description, image, rating, place_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        } else {
            "UPDATE places
             SET name = ?2, country = ?3, city = ?4, province = ?5, address = ?6,
                 description = ?7, image = ?8, rating = ?9, place_type = ?10
             WHERE id_place = ?1"
        };
        conn.execute(
            sql,
            params![
                place.id_place,
                place.name,
                place.country,
                place.city,
                place.province,
                place.address,
                place.description,
                place.image,
                place.rating,
                place.place_type,
            ],
        )?;
        Ok(())
    }

    /// Places whose name, city, province or country contains the keyword,
    /// optionally narrowed to one type and a minimum rating, best rated first
    pub async fn search(pool: &DbPool, filter: &PlaceSearch) -> Result<Vec<Place>> {
        let keyword = filter.keyword.trim();
        pool.with_connection(|conn| {
            record::select_where(
                conn,
                "(instr(lower(name), lower(?1)) > 0
                  OR instr(lower(city), lower(?1)) > 0
                  OR instr(lower(coalesce(province, '')), lower(?1)) > 0
                  OR instr(lower(country), lower(?1)) > 0)
                 AND (?2 IS NULL OR place_type = ?2)
                 AND (?3 IS NULL OR rating >= ?3)
                 ORDER BY rating DESC, rowid",
                params![keyword, filter.place_type, filter.min_rating],
            )
        })
        .await
    }
}

impl Repository for PlaceStore {
    type Record = Place;
    type New = NewPlace;
    type Patch = PlacePatch;
    type Selector = PlaceSelector;

    async fn create(pool: &DbPool, input: &NewPlace) -> Result<Place> {
        let place = pool
            .with_transaction(|conn, ids| {
                let place = Place {
                    id_place: ids.generate::<Place>(conn)?,
                    name: input.name.clone(),
                    country: input.country.clone(),
                    city: input.city.clone(),
                    province: input.province.clone(),
                    address: input.address.clone(),
                    description: input.description.clone(),
                    image: input.image.clone(),
                    rating: input.rating,
                    place_type: input.place_type,
                };
                Self::write(conn, &place, true)?;
                record::reload::<Place>(conn, &place.id_place)
            })
            .await?;

        log::info!("Created place {} ({})", place.id_place, place.name);
        Ok(place)
    }

    async fn update(pool: &DbPool, id: &str, patch: &PlacePatch) -> Result<Place> {
        pool.with_transaction(|conn, _| {
            let mut place = record::reload::<Place>(conn, id)?;
            patch.apply_to(&mut place);
            Self::write(conn, &place, false)?;
            log::debug!("Updated place {}", id);
            Ok(place)
        })
        .await
    }
}
