/// Membership of users in trips, keyed by the (id_user, id_trip) pair.
use super::models::{EntityKind, Page, Trip, TripMember, User};
use super::record::{self, Record};
use super::selector::{self, selectors, Lookup};
use super::validate;
use super::DbPool;
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, Row};

impl Record for TripMember {
    const KIND: EntityKind = EntityKind::TripMember;
    const COLUMNS: &'static str = "id_user, id_trip";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(TripMember {
            id_user: row.get(0)?,
            id_trip: row.get(1)?,
        })
    }
}

selectors! {
    pub enum TripMemberSelector for TripMember {
        IdUser => "idUser", "id_user = ?1 ORDER BY rowid", Many;
        IdTrip => "idTrip", "id_trip = ?1 ORDER BY rowid", Many;
    }
}

/// Trip membership storage operations
pub struct TripMemberStore;

impl TripMemberStore {
    fn find_pair(conn: &Connection, id_user: &str, id_trip: &str) -> Result<Option<TripMember>> {
        record::select_one_where(
            conn,
            "id_user = ?1 AND id_trip = ?2",
            params![id_user, id_trip],
        )
    }

    /// Add a user to a trip; both must exist and the pair must be new
    pub async fn create(pool: &DbPool, input: &TripMember) -> Result<TripMember> {
        let member = pool
            .with_transaction(|conn, _| {
                validate::require_exists::<User>(conn, &input.id_user)?;
                validate::require_exists::<Trip>(conn, &input.id_trip)?;

                if Self::find_pair(conn, &input.id_user, &input.id_trip)?.is_some() {
                    return Err(validate::duplicate(EntityKind::TripMember, "idTrip"));
                }

                conn.execute(
                    "INSERT INTO trip_members (id_user, id_trip) VALUES (?1, ?2)",
                    params![input.id_user, input.id_trip],
                )?;
                Ok(input.clone())
            })
            .await?;

        log::info!("User {} joined trip {}", member.id_user, member.id_trip);
        Ok(member)
    }

    pub async fn get(pool: &DbPool, id_user: &str, id_trip: &str) -> Result<Option<TripMember>> {
        pool.with_connection(|conn| Self::find_pair(conn, id_user, id_trip))
            .await
    }

    pub async fn list(pool: &DbPool, page: Page) -> Result<Vec<TripMember>> {
        pool.with_connection(|conn| record::list::<TripMember>(conn, page))
            .await
    }

    pub async fn find_by(pool: &DbPool, field: &str, value: &str) -> Result<Lookup<TripMember>> {
        let selector = <TripMemberSelector as selector::Selector>::parse(field)?;
        pool.with_connection(|conn| selector::find_with(conn, selector, value))
            .await
    }

    /// Users taking part in a trip
    pub async fn members_of_trip(pool: &DbPool, id_trip: &str) -> Result<Vec<User>> {
        pool.with_connection(|conn| {
            record::select_where(
                conn,
                "id_user IN (SELECT id_user FROM trip_members WHERE id_trip = ?1) ORDER BY rowid",
                params![id_trip],
            )
        })
        .await
    }

    /// Trips a user takes part in, earliest first
    pub async fn trips_of_user(pool: &DbPool, id_user: &str) -> Result<Vec<Trip>> {
        pool.with_connection(|conn| {
            record::select_where(
                conn,
                "id_trip IN (SELECT id_trip FROM trip_members WHERE id_user = ?1)
                 ORDER BY start_date, rowid",
                params![id_user],
            )
        })
        .await
    }

    pub async fn delete(pool: &DbPool, id_user: &str, id_trip: &str) -> Result<TripMember> {
        pool.with_transaction(|conn, _| {
            let member = Self::find_pair(conn, id_user, id_trip)?.ok_or_else(|| {
                StoreError::not_found(EntityKind::TripMember, format!("{id_user}/{id_trip}"))
            })?;
            conn.execute(
                "DELETE FROM trip_members WHERE id_user = ?1 AND id_trip = ?2",
                params![id_user, id_trip],
            )?;
            log::debug!("User {} left trip {}", id_user, id_trip);
            Ok(member)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewTrip, NewUser};
    use crate::db::{create_test_pool, Repository, TripStore, UserStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn on(month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, month, 1)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("Invalid date")
    }

    async fn seed_user(pool: &DbPool, username: &str) -> User {
        UserStore::create(
            pool,
            &NewUser {
                name: username.to_string(),
                username: username.to_string(),
                password: "hash".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create user")
    }

    async fn seed_trip(pool: &DbPool, name: &str, month: u32) -> Trip {
        TripStore::create(
            pool,
            &NewTrip {
                name: name.to_string(),
                start_date: on(month),
                end_date: None,
            },
        )
        .await
        .expect("Failed to create trip")
    }

    fn member(user: &User, trip: &Trip) -> TripMember {
        TripMember {
            id_user: user.id_user.clone(),
            id_trip: trip.id_trip.clone(),
        }
    }

    #[tokio::test]
    async fn test_join_and_list_both_ways() {
        let pool = create_test_pool();
        let ann = seed_user(&pool, "ann1").await;
        let bob = seed_user(&pool, "bob").await;
        let autumn = seed_trip(&pool, "Autumn", 9).await;
        let spring = seed_trip(&pool, "Spring", 3).await;

        for input in [
            member(&ann, &autumn),
            member(&ann, &spring),
            member(&bob, &autumn),
        ] {
            TripMemberStore::create(&pool, &input)
                .await
                .expect("Failed to add member");
        }

        let trips: Vec<String> = TripMemberStore::trips_of_user(&pool, &ann.id_user)
            .await
            .expect("Query failed")
            .into_iter()
            .map(|trip| trip.name)
            .collect();
        assert_eq!(trips, vec!["Spring", "Autumn"]);

        let members = TripMemberStore::members_of_trip(&pool, &autumn.id_trip)
            .await
            .expect("Query failed");
        assert_eq!(members.len(), 2);

        let by_trip = TripMemberStore::find_by(&pool, "idTrip", &spring.id_trip)
            .await
            .expect("Lookup failed");
        assert_eq!(by_trip.into_vec(), vec![member(&ann, &spring)]);
    }

    #[tokio::test]
    async fn test_duplicate_membership_rejected() {
        let pool = create_test_pool();
        let ann = seed_user(&pool, "ann1").await;
        let trip = seed_trip(&pool, "Hue", 6).await;

        TripMemberStore::create(&pool, &member(&ann, &trip))
            .await
            .expect("Failed to add member");
        let result = TripMemberStore::create(&pool, &member(&ann, &trip)).await;
        assert!(matches!(result, Err(StoreError::DuplicateValue { .. })));
    }

    #[tokio::test]
    async fn test_dangling_trip_is_not_found() {
        let pool = create_test_pool();
        let ann = seed_user(&pool, "ann1").await;
        let input = TripMember {
            id_user: ann.id_user.clone(),
            id_trip: "TR0404".to_string(),
        };

        match TripMemberStore::create(&pool, &input).await {
            Err(StoreError::NotFound { kind, .. }) => assert_eq!(kind, EntityKind::Trip),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_leave_trip() {
        let pool = create_test_pool();
        let ann = seed_user(&pool, "ann1").await;
        let trip = seed_trip(&pool, "Hue", 6).await;
        TripMemberStore::create(&pool, &member(&ann, &trip))
            .await
            .expect("Failed to add member");

        TripMemberStore::delete(&pool, &ann.id_user, &trip.id_trip)
            .await
            .expect("Failed to remove member");
        assert!(TripMemberStore::get(&pool, &ann.id_user, &trip.id_trip)
            .await
            .expect("Query failed")
            .is_none());

        let again = TripMemberStore::delete(&pool, &ann.id_user, &trip.id_trip).await;
        assert!(matches!(again, Err(StoreError::NotFound { .. })));
    }
}
