/// Bookings of a place by a user.
///
/// `id_booking` is the sole primary key; `id_user` and `id_place` are plain
/// references checked when written. Status only moves forward from Pending.
use super::models::{Booking, BookingPatch, EntityKind, NewBooking, Place, User};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::validate;
use super::DbPool;
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, Row};

impl Record for Booking {
    const KIND: EntityKind = EntityKind::Booking;
    const COLUMNS: &'static str = "id_booking, id_user, id_place, date, status";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Booking {
            id_booking: row.get(0)?,
            id_user: row.get(1)?,
            id_place: row.get(2)?,
            date: row.get(3)?,
            status: row.get(4)?,
        })
    }
}

impl Keyed for Booking {
    const KEY: &'static str = "id_booking";
    const ID_PREFIX: &'static str = "BK";

    fn id(&self) -> &str {
        &self.id_booking
    }
}

selectors! {
    pub enum BookingSelector for Booking {
        IdBooking => "idBooking", "id_booking = ?1", One;
        IdUser => "idUser", "id_user = ?1 ORDER BY date, rowid", Many;
        IdPlace => "idPlace", "id_place = ?1 ORDER BY date, rowid", Many;
        Status => "status", "status = ?1 ORDER BY date, rowid", Many;
    }
}

/// Booking storage operations
pub struct BookingStore;

impl BookingStore {
    fn write(conn: &Connection, booking: &Booking, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO bookings (id_booking, id_user, id_place, date, status) VALUES (?1, ?2, ?3, ?4, ?5)"
        } else {
            "UPDATE bookings SET id_user = ?2, id_place = ?3, date = ?4, status = ?5 WHERE id_booking = ?1"
        };
        conn.execute(
            sql,
            params![
                booking.id_booking,
                booking.id_user,
                booking.id_place,
                booking.date,
                booking.status,
            ],
        )?;
        Ok(())
    }
}

impl Repository for BookingStore {
    type Record = Booking;
    type New = NewBooking;
    type Patch = BookingPatch;
    type Selector = BookingSelector;

    async fn create(pool: &DbPool, input: &NewBooking) -> Result<Booking> {
        let booking = pool
            .with_transaction(|conn, ids| {
                validate::require_exists::<User>(conn, &input.id_user)?;
                validate::require_exists::<Place>(conn, &input.id_place)?;

                let booking = Booking {
                    id_booking: ids.generate::<Booking>(conn)?,
                    id_user: input.id_user.clone(),
                    id_place: input.id_place.clone(),
                    date: input.date,
                    status: input.status,
                };
                Self::write(conn, &booking, true)?;
                record::reload::<Booking>(conn, &booking.id_booking)
            })
            .await?;

        log::info!(
            "Created booking {} of {} by {}",
            booking.id_booking,
            booking.id_place,
            booking.id_user
        );
        Ok(booking)
    }

    async fn update(pool: &DbPool, id: &str, patch: &BookingPatch) -> Result<Booking> {
        pool.with_transaction(|conn, _| {
            let mut booking = record::reload::<Booking>(conn, id)?;

            if let Some(id_user) = &patch.id_user {
                validate::require_exists::<User>(conn, id_user)?;
            }
            if let Some(id_place) = &patch.id_place {
                validate::require_exists::<Place>(conn, id_place)?;
            }
            if let Some(next) = patch.status {
                if !booking.status.can_transition_to(next) {
                    return Err(StoreError::InvalidStatusTransition {
                        from: booking.status,
                        to: next,
                    });
                }
            }

            patch.apply_to(&mut booking);
            Self::write(conn, &booking, false)?;
            log::debug!("Updated booking {} (status {})", id, booking.status);
            Ok(booking)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{BookingStatus, NewPlace, NewUser};
    use crate::db::{create_test_pool, PlaceStore, UserStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn june_first() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|date| date.and_hms_opt(14, 30, 0))
            .expect("Invalid date")
    }

    async fn seed(pool: &DbPool) -> (User, Place) {
        let user = UserStore::create(
            pool,
            &NewUser {
                name: "Ann".to_string(),
                username: "ann1".to_string(),
                password: "hash".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create user");
        let place = PlaceStore::create(
            pool,
            &NewPlace {
                name: "Imperial City".to_string(),
                country: "Vietnam".to_string(),
                city: "Hue".to_string(),
                address: "Hue Citadel".to_string(),
                rating: 5,
                place_type: 1,
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create place");
        (user, place)
    }

    fn booking_for(user: &User, id_place: &str) -> NewBooking {
        NewBooking {
            id_user: user.id_user.clone(),
            id_place: id_place.to_string(),
            date: june_first(),
            status: BookingStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_create_booking() {
        let pool = create_test_pool();
        let (user, place) = seed(&pool).await;

        let booking = BookingStore::create(&pool, &booking_for(&user, &place.id_place))
            .await
            .expect("Failed to create booking");

        assert!(booking.id_booking.starts_with("BK"));
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.date, june_first());

        let stored = BookingStore::get(&pool, &booking.id_booking)
            .await
            .expect("Query failed")
            .expect("Booking not found");
        assert_eq!(stored, booking);
    }

    #[tokio::test]
    async fn test_dangling_place_is_not_found_and_writes_nothing() {
        let pool = create_test_pool();
        let (user, _) = seed(&pool).await;

        match BookingStore::create(&pool, &booking_for(&user, "PL9999")).await {
            Err(StoreError::NotFound { kind, id }) => {
                assert_eq!(kind, EntityKind::Place);
                assert_eq!(id, "PL9999");
            }
            other => panic!("Unexpected result: {other:?}"),
        }

        let bookings = BookingStore::find_by(&pool, "idUser", &user.id_user)
            .await
            .expect("Lookup failed");
        assert!(bookings.is_empty());
    }

    #[tokio::test]
    async fn test_status_moves_forward_only() {
        let pool = create_test_pool();
        let (user, place) = seed(&pool).await;
        let booking = BookingStore::create(&pool, &booking_for(&user, &place.id_place))
            .await
            .expect("Failed to create booking");

        let succeed = BookingPatch {
            status: Some(BookingStatus::Success),
            ..Default::default()
        };
        let updated = BookingStore::update(&pool, &booking.id_booking, &succeed)
            .await
            .expect("Failed to update booking");
        assert_eq!(updated.status, BookingStatus::Success);

        let reopen = BookingPatch {
            status: Some(BookingStatus::Pending),
            ..Default::default()
        };
        match BookingStore::update(&pool, &booking.id_booking, &reopen).await {
            Err(StoreError::InvalidStatusTransition { from, to }) => {
                assert_eq!(from, BookingStatus::Success);
                assert_eq!(to, BookingStatus::Pending);
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_revalidates_references() {
        let pool = create_test_pool();
        let (user, place) = seed(&pool).await;
        let booking = BookingStore::create(&pool, &booking_for(&user, &place.id_place))
            .await
            .expect("Failed to create booking");

        let repoint = BookingPatch {
            id_place: Some("PL9999".to_string()),
            ..Default::default()
        };
        let result = BookingStore::update(&pool, &booking.id_booking, &repoint).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));

        let unchanged = BookingStore::get(&pool, &booking.id_booking)
            .await
            .expect("Query failed")
            .expect("Booking not found");
        assert_eq!(unchanged.id_place, place.id_place);
    }

    #[tokio::test]
    async fn test_find_by_status() {
        let pool = create_test_pool();
        let (user, place) = seed(&pool).await;
        BookingStore::create(&pool, &booking_for(&user, &place.id_place))
            .await
            .expect("Failed to create booking");

        let pending = BookingStore::find_by(&pool, "status", "0").await.expect("Lookup failed");
        assert_eq!(pending.into_vec().len(), 1);
        let failed = BookingStore::find_by(&pool, "status", "2").await.expect("Lookup failed");
        assert!(failed.is_empty());
    }
}
