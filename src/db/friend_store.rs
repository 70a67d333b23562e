/// Friendships between users.
///
/// Stored directionally as (id_self, id_friend) where `id_self` sent the
/// request, but a pair is one friendship whichever way round it is queried.
/// The table carries no generated id; the pair is the key.
use super::models::{EntityKind, Friend, NewFriend, Page, User};
use super::record::{self, Record};
use super::selector::{self, selectors, Lookup};
use super::validate;
use super::DbPool;
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection, Row};

/// Matches a pair in either direction with the two ids bound as ?1 and ?2
const PAIR_FILTER: &str = "(id_self = ?1 AND id_friend = ?2) OR (id_self = ?2 AND id_friend = ?1)";

impl Record for Friend {
    const KIND: EntityKind = EntityKind::Friend;
    const COLUMNS: &'static str = "id_self, id_friend, is_accept";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Friend {
            id_self: row.get(0)?,
            id_friend: row.get(1)?,
            is_accept: row.get(2)?,
        })
    }
}

selectors! {
    /// `idUser` matches either side of the pair
    pub enum FriendSelector for Friend {
        IdUser => "idUser", "(id_self = ?1 OR id_friend = ?1) ORDER BY rowid", Many;
        IdSelf => "idSelf", "id_self = ?1 ORDER BY rowid", Many;
        IdFriend => "idFriend", "id_friend = ?1 ORDER BY rowid", Many;
    }
}

/// Friendship storage operations
pub struct FriendStore;

impl FriendStore {
    fn find_pair(conn: &Connection, a: &str, b: &str) -> Result<Option<Friend>> {
        record::select_one_where(conn, PAIR_FILTER, params![a, b])
    }

    fn require_pair(conn: &Connection, a: &str, b: &str) -> Result<Friend> {
        Self::find_pair(conn, a, b)?
            .ok_or_else(|| StoreError::not_found(EntityKind::Friend, format!("{a}/{b}")))
    }

    /// Record a friendship request.
    ///
    /// Self-friendship is rejected before either id is looked up; an
    /// existing pair in either direction is a duplicate.
    pub async fn create(pool: &DbPool, input: &NewFriend) -> Result<Friend> {
        validate::require_distinct(&input.id_self, &input.id_friend)?;

        let friend = pool
            .with_transaction(|conn, _| {
                validate::require_exists::<User>(conn, &input.id_self)?;
                validate::require_exists::<User>(conn, &input.id_friend)?;

                if Self::find_pair(conn, &input.id_self, &input.id_friend)?.is_some() {
                    return Err(validate::duplicate(EntityKind::Friend, "idFriend"));
                }

                conn.execute(
                    "INSERT INTO friends (id_self, id_friend, is_accept) VALUES (?1, ?2, ?3)",
                    params![input.id_self, input.id_friend, input.is_accept],
                )?;
                Self::require_pair(conn, &input.id_self, &input.id_friend)
            })
            .await?;

        log::info!("Friend request {} -> {}", friend.id_self, friend.id_friend);
        Ok(friend)
    }

    /// The friendship between two users, in whichever direction it was stored
    pub async fn get(pool: &DbPool, a: &str, b: &str) -> Result<Option<Friend>> {
        pool.with_connection(|conn| Self::find_pair(conn, a, b)).await
    }

    pub async fn list(pool: &DbPool, page: Page) -> Result<Vec<Friend>> {
        pool.with_connection(|conn| record::list::<Friend>(conn, page))
            .await
    }

    /// Every friendship `id_user` takes part in, on either side
    pub async fn friends_of(pool: &DbPool, id_user: &str) -> Result<Vec<Friend>> {
        pool.with_connection(|conn| {
            selector::find_with(conn, FriendSelector::IdUser, id_user).map(Lookup::into_vec)
        })
        .await
    }

    pub async fn find_by(pool: &DbPool, field: &str, value: &str) -> Result<Lookup<Friend>> {
        let selector = <FriendSelector as selector::Selector>::parse(field)?;
        pool.with_connection(|conn| selector::find_with(conn, selector, value))
            .await
    }

    /// Accept a pending request. Accepting twice is a no-op.
    pub async fn accept(pool: &DbPool, a: &str, b: &str) -> Result<Friend> {
        pool.with_transaction(|conn, _| {
            let mut friend = Self::require_pair(conn, a, b)?;
            if !friend.is_accept {
                conn.execute(
                    "UPDATE friends SET is_accept = 1 WHERE id_self = ?1 AND id_friend = ?2",
                    params![friend.id_self, friend.id_friend],
                )?;
                friend.is_accept = true;
                log::info!("Friendship {} <-> {} accepted", friend.id_self, friend.id_friend);
            }
            Ok(friend)
        })
        .await
    }

    /// Remove the friendship between two users, returning the removed row
    pub async fn delete(pool: &DbPool, a: &str, b: &str) -> Result<Friend> {
        pool.with_transaction(|conn, _| {
            let friend = Self::require_pair(conn, a, b)?;
            conn.execute(
                "DELETE FROM friends WHERE id_self = ?1 AND id_friend = ?2",
                params![friend.id_self, friend.id_friend],
            )?;
            log::debug!("Deleted friendship {} <-> {}", friend.id_self, friend.id_friend);
            Ok(friend)
        })
        .await
    }
}
