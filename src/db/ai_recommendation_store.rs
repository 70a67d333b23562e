/// Recommendation requests and their externally produced output.
///
/// `output` is opaque text written back by whatever service answers the
/// request; nothing here interprets it.
use super::models::{
    AiRecommendation, AiRecommendationPatch, EntityKind, NewAiRecommendation, User,
};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::validate;
use super::DbPool;
use crate::error::Result;
use rusqlite::{params, Connection, Row};

impl Record for AiRecommendation {
    const KIND: EntityKind = EntityKind::AiRecommendation;
    const COLUMNS: &'static str = "id_ai_rec, id_user, input, output";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(AiRecommendation {
            id_ai_rec: row.get(0)?,
            id_user: row.get(1)?,
            input: row.get(2)?,
            output: row.get(3)?,
        })
    }
}

impl Keyed for AiRecommendation {
    const KEY: &'static str = "id_ai_rec";
    const ID_PREFIX: &'static str = "AI";

    fn id(&self) -> &str {
        &self.id_ai_rec
    }
}

selectors! {
    pub enum AiRecommendationSelector for AiRecommendation {
        IdAiRec => "idAIRec", "id_ai_rec = ?1", One;
        IdUser => "idUser", "id_user = ?1 ORDER BY rowid", Many;
    }
}

pub struct AiRecommendationStore;

impl AiRecommendationStore {
    fn write(conn: &Connection, rec: &AiRecommendation, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO ai_recommendations (id_ai_rec, id_user, input, output) VALUES (?1, ?2, ?3, ?4)"
        } else {
            "UPDATE ai_recommendations SET id_user = ?2, input = ?3, output = ?4 WHERE id_ai_rec = ?1"
        };
        conn.execute(sql, params![rec.id_ai_rec, rec.id_user, rec.input, rec.output])?;
        Ok(())
    }
}

impl Repository for AiRecommendationStore {
    type Record = AiRecommendation;
    type New = NewAiRecommendation;
    type Patch = AiRecommendationPatch;
    type Selector = AiRecommendationSelector;

    async fn create(pool: &DbPool, input: &NewAiRecommendation) -> Result<AiRecommendation> {
        let rec = pool
            .with_transaction(|conn, ids| {
                validate::require_exists::<User>(conn, &input.id_user)?;

                let rec = AiRecommendation {
                    id_ai_rec: ids.generate::<AiRecommendation>(conn)?,
                    id_user: input.id_user.clone(),
                    input: input.input.clone(),
                    output: input.output.clone(),
                };
                Self::write(conn, &rec, true)?;
                record::reload::<AiRecommendation>(conn, &rec.id_ai_rec)
            })
            .await?;

        log::info!("Created recommendation request {} for {}", rec.id_ai_rec, rec.id_user);
        Ok(rec)
    }

    async fn update(
        pool: &DbPool,
        id: &str,
        patch: &AiRecommendationPatch,
    ) -> Result<AiRecommendation> {
        pool.with_transaction(|conn, _| {
            let mut rec = record::reload::<AiRecommendation>(conn, id)?;
            patch.apply_to(&mut rec);
            Self::write(conn, &rec, false)?;
            Ok(rec)
        })
        .await
    }
}
