/// CRUD contract shared by every single-key entity store.
///
/// `create` and `update` are entity specific; reads, selector lookups and
/// deletes are identical for every table and provided here.
use super::models::Page;
use super::record::{self, Keyed};
use super::selector::{self, Lookup, Selector};
use super::DbPool;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[allow(async_fn_in_trait)]
pub trait Repository: 'static {
    type Record: Keyed + Serialize + 'static;
    type New: DeserializeOwned + 'static;
    type Patch: DeserializeOwned + 'static;
    type Selector: Selector<Record = Self::Record>;

    /// Validate references and unique fields, assign an id and insert
    async fn create(pool: &DbPool, input: &Self::New) -> Result<Self::Record>;

    /// Apply only the fields present in `patch`
    async fn update(pool: &DbPool, id: &str, patch: &Self::Patch) -> Result<Self::Record>;

    async fn get(pool: &DbPool, id: &str) -> Result<Option<Self::Record>> {
        pool.with_connection(|conn| record::fetch::<Self::Record>(conn, id))
            .await
    }

    async fn list(pool: &DbPool, page: Page) -> Result<Vec<Self::Record>> {
        pool.with_connection(|conn| record::list::<Self::Record>(conn, page))
            .await
    }

    async fn find_by(pool: &DbPool, field: &str, value: &str) -> Result<Lookup<Self::Record>> {
        let selector = Self::Selector::parse(field)?;
        pool.with_connection(|conn| selector::find_with(conn, selector, value))
            .await
    }

    /// Remove the row; nothing referencing it is touched
    async fn delete(pool: &DbPool, id: &str) -> Result<Self::Record> {
        pool.with_transaction(|conn, _| record::remove::<Self::Record>(conn, id))
            .await
    }
}
