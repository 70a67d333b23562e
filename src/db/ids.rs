/// Short prefixed identifiers (`US0042`, `NTF0007`, ...).
///
/// A candidate is a fixed prefix per entity kind plus a zero-padded random
/// suffix. Candidates already present in the table are rejected and redrawn,
/// up to a fixed number of attempts. Callers run generation inside the
/// creating transaction so the free candidate cannot be taken before insert.
use super::record::{self, Keyed};
use crate::error::{Result, StoreError};
use rand::Rng;
use rusqlite::Connection;

/// Digits in every generated suffix
pub const SUFFIX_WIDTH: usize = 4;

/// Number of distinct suffixes (`0000` ..= `9999`)
pub const SUFFIX_SPACE: u32 = 10_000;

/// Default number of candidates tried before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 64;

#[derive(Debug, Clone, Copy)]
pub struct IdGenerator {
    max_attempts: u32,
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl IdGenerator {
    pub fn new(max_attempts: u32) -> Self {
        IdGenerator { max_attempts }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Generate a free identifier for `T` using the thread-local RNG
    pub fn generate<T: Keyed>(&self, conn: &Connection) -> Result<String> {
        self.generate_with::<T, _>(conn, &mut rand::rng())
    }

    /// Generate a free identifier for `T` drawing suffixes from `rng`
    pub fn generate_with<T, R>(&self, conn: &Connection, rng: &mut R) -> Result<String>
    where
        T: Keyed,
        R: Rng + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            let candidate = format_id(T::ID_PREFIX, rng.random_range(0..SUFFIX_SPACE));
            if !record::exists::<T>(conn, &candidate)? {
                return Ok(candidate);
            }
            log::debug!(
                "{} id {} taken (attempt {}/{})",
                T::KIND,
                candidate,
                attempt,
                self.max_attempts
            );
        }

        log::warn!(
            "Gave up generating a {} id after {} attempts",
            T::KIND,
            self.max_attempts
        );
        Err(StoreError::IdentifierExhaustion {
            kind: T::KIND,
            attempts: self.max_attempts,
        })
    }
}

/// Render `prefix` followed by `suffix` padded to [`SUFFIX_WIDTH`] digits
pub fn format_id(prefix: &str, suffix: u32) -> String {
    format!("{prefix}{suffix:0width$}", width = SUFFIX_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::models::{AiRecommendation, EntityKind, Notification, Place, User};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn insert_place(conn: &Connection, id: &str) {
        conn.execute(
            "INSERT INTO places (id_place, name, country, city, address, rating, place_type)
             VALUES (?1, 'Citadel', 'Vietnam', 'Hue', '1 Main St', 5, 1)",
            [id],
        )
        .expect("Failed to insert place");
    }

    #[test]
    fn test_format_id_pads_to_fixed_width() {
        assert_eq!(format_id("US", 7), "US0007");
        assert_eq!(format_id("US", 42), "US0042");
        assert_eq!(format_id("US", 999), "US0999");
        assert_eq!(format_id("US", 9999), "US9999");
        assert_eq!(format_id("NTF", 0), "NTF0000");
    }

    #[tokio::test]
    async fn test_generated_ids_carry_kind_prefix() {
        let pool = create_test_pool();

        let (user_id, notify_id, ai_id) = pool
            .with_connection(|conn| {
                Ok((
                    pool.ids().generate::<User>(conn)?,
                    pool.ids().generate::<Notification>(conn)?,
                    pool.ids().generate::<AiRecommendation>(conn)?,
                ))
            })
            .await
            .expect("Generation failed");

        assert!(user_id.starts_with("US"));
        assert_eq!(user_id.len(), 6);
        assert!(user_id[2..].chars().all(|c| c.is_ascii_digit()));
        assert!(notify_id.starts_with("NTF"));
        assert_eq!(notify_id.len(), 7);
        assert!(ai_id.starts_with("AI"));
    }

    #[tokio::test]
    async fn test_taken_candidate_is_redrawn() {
        let pool = create_test_pool();

        let mut replay = StdRng::seed_from_u64(7);
        let first = format_id("PL", replay.random_range(0..SUFFIX_SPACE));

        let generated = pool
            .with_connection(|conn| {
                insert_place(conn, &first);
                IdGenerator::new(16).generate_with::<Place, _>(conn, &mut StdRng::seed_from_u64(7))
            })
            .await
            .expect("Generation failed");

        assert_ne!(generated, first);
        assert!(generated.starts_with("PL"));
    }

    #[tokio::test]
    async fn test_exhaustion_after_bounded_attempts() {
        let pool = create_test_pool();

        let mut replay = StdRng::seed_from_u64(11);
        let first = format_id("PL", replay.random_range(0..SUFFIX_SPACE));

        let err = pool
            .with_connection(|conn| {
                insert_place(conn, &first);
                IdGenerator::new(1).generate_with::<Place, _>(conn, &mut StdRng::seed_from_u64(11))
            })
            .await
            .expect_err("Generation should be exhausted");

        match err {
            StoreError::IdentifierExhaustion { kind, attempts } => {
                assert_eq!(kind, EntityKind::Place);
                assert_eq!(attempts, 1);
            }
            other => panic!("Unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_attempts_never_loops() {
        let pool = create_test_pool();

        let result = pool
            .with_connection(|conn| IdGenerator::new(0).generate::<User>(conn))
            .await;

        assert!(matches!(
            result,
            Err(StoreError::IdentifierExhaustion { attempts: 0, .. })
        ));
    }
}
