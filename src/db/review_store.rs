/// Reviews left by users on trips.
use super::models::{EntityKind, NewReview, Review, ReviewPatch, Trip, User};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::validate;
use super::DbPool;
use crate::error::Result;
use rusqlite::{params, Connection, Row};

/// How many reviews the "best of" listing returns
pub const BEST_REVIEWS_LIMIT: u32 = 5;

impl Record for Review {
    const KIND: EntityKind = EntityKind::Review;
    const COLUMNS: &'static str = "id_review, id_trip, id_user, comment, rating";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Review {
            id_review: row.get(0)?,
            id_trip: row.get(1)?,
            id_user: row.get(2)?,
            comment: row.get(3)?,
            rating: row.get(4)?,
        })
    }
}

impl Keyed for Review {
    const KEY: &'static str = "id_review";
    const ID_PREFIX: &'static str = "RV";

    fn id(&self) -> &str {
        &self.id_review
    }
}

selectors! {
    pub enum ReviewSelector for Review {
        IdReview => "idReview", "id_review = ?1", One;
        IdTrip => "idTrip", "id_trip = ?1 ORDER BY rowid", Many;
        IdUser => "idUser", "id_user = ?1 ORDER BY rowid", Many;
    }
}

/// Review storage operations
pub struct ReviewStore;

impl ReviewStore {
    fn write(conn: &Connection, review: &Review, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO reviews (id_review, id_trip, id_user, comment, rating) VALUES (?1, ?2, ?3, ?4, ?5)"
        } else {
            "UPDATE reviews SET id_trip = ?2, id_user = ?3, comment = ?4, rating = ?5 WHERE id_review = ?1"
        };
        conn.execute(
            sql,
            params![
                review.id_review,
                review.id_trip,
                review.id_user,
                review.comment,
                review.rating,
            ],
        )?;
        Ok(())
    }

    /// Highest rated reviews of a trip, oldest first among equal ratings
    pub async fn best_for_trip(pool: &DbPool, id_trip: &str) -> Result<Vec<Review>> {
        pool.with_connection(|conn| {
            record::select_where(
                conn,
                "id_trip = ?1 ORDER BY rating DESC, rowid LIMIT ?2",
                params![id_trip, BEST_REVIEWS_LIMIT],
            )
        })
        .await
    }
}

impl Repository for ReviewStore {
    type Record = Review;
    type New = NewReview;
    type Patch = ReviewPatch;
    type Selector = ReviewSelector;

    async fn create(pool: &DbPool, input: &NewReview) -> Result<Review> {
        let review = pool
            .with_transaction(|conn, ids| {
                validate::require_exists::<Trip>(conn, &input.id_trip)?;
                validate::require_exists::<User>(conn, &input.id_user)?;

                let review = Review {
                    id_review: ids.generate::<Review>(conn)?,
                    id_trip: input.id_trip.clone(),
                    id_user: input.id_user.clone(),
                    comment: input.comment.clone(),
                    rating: input.rating,
                };
                Self::write(conn, &review, true)?;
                record::reload::<Review>(conn, &review.id_review)
            })
            .await?;

        log::info!(
            "Created review {} of trip {} by {}",
            review.id_review,
            review.id_trip,
            review.id_user
        );
        Ok(review)
    }

    async fn update(pool: &DbPool, id: &str, patch: &ReviewPatch) -> Result<Review> {
        pool.with_transaction(|conn, _| {
            let mut review = record::reload::<Review>(conn, id)?;
            patch.apply_to(&mut review);
            Self::write(conn, &review, false)?;
            log::debug!("Updated review {}", id);
            Ok(review)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{NewTrip, NewUser};
    use crate::db::{create_test_pool, TripStore, UserStore};
    use crate::error::StoreError;
    use chrono::NaiveDate;

    async fn seed(pool: &DbPool) -> (Trip, User) {
        let trip = TripStore::create(
            pool,
            &NewTrip {
                name: "Hue".to_string(),
                start_date: NaiveDate::from_ymd_opt(2025, 6, 1)
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
                    .expect("Invalid date"),
                end_date: None,
            },
        )
        .await
        .expect("Failed to create trip");
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
        (trip, user)
    }

    fn review(trip: &Trip, user: &User, rating: i64) -> NewReview {
        NewReview {
            id_trip: trip.id_trip.clone(),
            id_user: user.id_user.clone(),
            comment: Some(format!("{rating} stars")),
            rating,
        }
    }

    #[tokio::test]
    async fn test_create_review_round_trip() {
        let pool = create_test_pool();
        let (trip, user) = seed(&pool).await;

        let created = ReviewStore::create(&pool, &review(&trip, &user, 4))
            .await
            .expect("Failed to create review");
        assert!(created.id_review.starts_with("RV"));

        let stored = ReviewStore::get(&pool, &created.id_review)
            .await
            .expect("Query failed")
            .expect("Review not found");
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn test_missing_trip_is_not_found() {
        let pool = create_test_pool();
        let (_, user) = seed(&pool).await;

        let input = NewReview {
            id_trip: "TR9999".to_string(),
            id_user: user.id_user.clone(),
            comment: None,
            rating: 3,
        };
        match ReviewStore::create(&pool, &input).await {
            Err(StoreError::NotFound { kind, .. }) => assert_eq!(kind, EntityKind::Trip),
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_best_reviews_for_trip() {
        let pool = create_test_pool();
        let (trip, user) = seed(&pool).await;

        for rating in [2, 5, 3, 1, 4, 5] {
            ReviewStore::create(&pool, &review(&trip, &user, rating))
                .await
                .expect("Failed to create review");
        }

        let best: Vec<i64> = ReviewStore::best_for_trip(&pool, &trip.id_trip)
            .await
            .expect("Query failed")
            .into_iter()
            .map(|review| review.rating)
            .collect();
        assert_eq!(best, vec![5, 5, 4, 3, 2]);
    }

    #[tokio::test]
    async fn test_update_clears_comment() {
        let pool = create_test_pool();
        let (trip, user) = seed(&pool).await;
        let created = ReviewStore::create(&pool, &review(&trip, &user, 4))
            .await
            .expect("Failed to create review");

        let patch = ReviewPatch {
            comment: Some(None),
            rating: None,
        };
        let updated = ReviewStore::update(&pool, &created.id_review, &patch)
            .await
            .expect("Failed to update review");
        assert_eq!(updated.comment, None);
        assert_eq!(updated.rating, 4);
    }
}
