/// User accounts.
/// Username, email and phone are unique across the table; the password is
/// stored exactly as received (hashed upstream).
use super::models::{EntityKind, NewUser, User, UserPatch};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::validate;
use super::DbPool;
use crate::error::Result;
use rusqlite::{params, Connection, Row};

impl Record for User {
    const KIND: EntityKind = EntityKind::User;
    const COLUMNS: &'static str =
        "id_user, name, username, password, gender, email, phone, avatar, theme, language";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id_user: row.get(0)?,
            name: row.get(1)?,
            username: row.get(2)?,
            password: row.get(3)?,
            gender: row.get(4)?,
            email: row.get(5)?,
            phone: row.get(6)?,
            avatar: row.get(7)?,
            theme: row.get(8)?,
            language: row.get(9)?,
        })
    }
}

impl Keyed for User {
    const KEY: &'static str = "id_user";
    const ID_PREFIX: &'static str = "US";

    fn id(&self) -> &str {
        &self.id_user
    }
}

selectors! {
    /// Queryable fields of [`User`]; all of them are unique
    pub enum UserSelector for User {
        IdUser => "idUser", "id_user = ?1", One;
        Username => "username", "username = ?1", One;
        Email => "email", "email = ?1", One;
        Phone => "phone", "phone = ?1", One;
    }
}

/// User storage operations
pub struct UserStore;

impl UserStore {
    /// Check username, email and phone against every row except `exclude_id`
    fn require_unique_fields(
        conn: &Connection,
        username: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        exclude_id: Option<&str>,
    ) -> Result<()> {
        let fields = [
            ("username", username),
            ("email", email),
            ("phone", phone),
        ];
        for (column, value) in fields {
            if let Some(value) = value {
                validate::require_unique::<User>(conn, column, column, value, exclude_id)?;
            }
        }
        Ok(())
    }

    fn write(conn: &Connection, user: &User, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO users (id_user, name, username, password, gender, email, phone, avatar, theme, language)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        } else {
            "UPDATE users
             SET name = ?2, username = ?3, password = ?4, gender = ?5, email = ?6,
                 phone = ?7, avatar = ?8, theme = ?9, language = ?10
             WHERE id_user = ?1"
        };
        conn.execute(
            sql,
            params![
                user.id_user,
                user.name,
                user.username,
                user.password,
                user.gender,
                user.email,
                user.phone,
                user.avatar,
                user.theme,
                user.language,
            ],
        )?;
        Ok(())
    }
}

impl Repository for UserStore {
    type Record = User;
    type New = NewUser;
    type Patch = UserPatch;
    type Selector = UserSelector;

    async fn create(pool: &DbPool, input: &NewUser) -> Result<User> {
        let user = pool
            .with_transaction(|conn, ids| {
                Self::require_unique_fields(
                    conn,
                    Some(&input.username),
                    input.email.as_deref(),
                    input.phone.as_deref(),
                    None,
                )?;

                let id_user = ids.generate::<User>(conn)?;
                let user = User {
                    id_user,
                    name: input.name.clone(),
                    username: input.username.clone(),
                    password: input.password.clone(),
                    gender: input.gender,
                    email: input.email.clone(),
                    phone: input.phone.clone(),
                    avatar: input.avatar.clone(),
                    theme: input.theme.unwrap_or(0),
                    language: input.language.unwrap_or(0),
                };
                Self::write(conn, &user, true)?;
                record::reload::<User>(conn, &user.id_user)
            })
            .await?;

        log::info!("Registered user {} ({})", user.id_user, user.username);
        Ok(user)
    }

    async fn update(pool: &DbPool, id: &str, patch: &UserPatch) -> Result<User> {
        pool.with_transaction(|conn, _| {
            let mut user = record::reload::<User>(conn, id)?;

            Self::require_unique_fields(
                conn,
                patch.username.as_deref(),
                patch.email.as_ref().and_then(|email| email.as_deref()),
                patch.phone.as_ref().and_then(|phone| phone.as_deref()),
                Some(id),
            )?;

            patch.apply_to(&mut user);
            Self::write(conn, &user, false)?;
            log::debug!("Updated user {}", id);
            Ok(user)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::models::Page;
    use crate::db::selector::Lookup;
    use crate::error::StoreError;

    fn ann() -> NewUser {
        NewUser {
            name: "Ann".to_string(),
            username: "ann1".to_string(),
            password: "hash".to_string(),
            email: Some("a@x.com".to_string()),
            phone: Some("0123456789".to_string()),
            ..Default::default()
        }
    }

    fn bob() -> NewUser {
        NewUser {
            name: "Bob".to_string(),
            username: "bob".to_string(),
            password: "hash2".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_user() {
        let pool = create_test_pool();
        let user = UserStore::create(&pool, &ann())
            .await
            .expect("Failed to create user");

        assert_eq!(user.id_user.len(), 6);
        assert!(user.id_user.starts_with("US"));
        assert_eq!(user.name, "Ann");
        assert_eq!(user.username, "ann1");
        assert_eq!(user.email.as_deref(), Some("a@x.com"));
        assert_eq!(user.phone.as_deref(), Some("0123456789"));
        assert_eq!(user.password, "hash");
        assert_eq!(user.theme, 0);
        assert_eq!(user.language, 0);

        let stored = UserStore::get(&pool, &user.id_user)
            .await
            .expect("Query failed")
            .expect("User not found");
        assert_eq!(stored, user);
    }

    #[tokio::test]
    async fn test_duplicate_unique_fields_rejected() {
        let pool = create_test_pool();
        UserStore::create(&pool, &ann()).await.expect("Failed to create user");

        let same_username = NewUser {
            email: None,
            phone: None,
            ..ann()
        };
        let same_email = NewUser {
            username: "ann2".to_string(),
            phone: None,
            ..ann()
        };
        let same_phone = NewUser {
            username: "ann3".to_string(),
            email: None,
            ..ann()
        };

        for (input, expected) in [
            (same_username, "username"),
            (same_email, "email"),
            (same_phone, "phone"),
        ] {
            match UserStore::create(&pool, &input).await {
                Err(StoreError::DuplicateValue { kind, field }) => {
                    assert_eq!(kind, EntityKind::User);
                    assert_eq!(field, expected);
                }
                other => panic!("Unexpected result: {other:?}"),
            }
        }

        let all = UserStore::list(&pool, Page::default()).await.expect("Query failed");
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_users_without_contact_details_coexist() {
        let pool = create_test_pool();
        UserStore::create(&pool, &bob()).await.expect("Failed to create bob");
        let carol = NewUser {
            username: "carol".to_string(),
            ..bob()
        };
        UserStore::create(&pool, &carol).await.expect("Failed to create carol");
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let pool = create_test_pool();
        let user = UserStore::create(&pool, &ann()).await.expect("Failed to create user");

        let patch = UserPatch {
            theme: Some(1),
            ..Default::default()
        };
        let updated = UserStore::update(&pool, &user.id_user, &patch)
            .await
            .expect("Failed to update user");

        assert_eq!(updated.theme, 1);
        assert_eq!(
            updated,
            User {
                theme: 1,
                ..user.clone()
            }
        );
    }

    #[tokio::test]
    async fn test_update_rechecks_uniqueness_against_other_rows() {
        let pool = create_test_pool();
        let ann = UserStore::create(&pool, &ann()).await.expect("Failed to create ann");
        let bob = UserStore::create(&pool, &bob()).await.expect("Failed to create bob");

        let steal_email = UserPatch {
            email: Some(Some("a@x.com".to_string())),
            ..Default::default()
        };
        let result = UserStore::update(&pool, &bob.id_user, &steal_email).await;
        assert!(matches!(result, Err(StoreError::DuplicateValue { .. })));

        // Re-submitting your own username is not a collision
        let keep_username = UserPatch {
            username: Some("ann1".to_string()),
            name: Some("Annie".to_string()),
            ..Default::default()
        };
        let updated = UserStore::update(&pool, &ann.id_user, &keep_username)
            .await
            .expect("Failed to update user");
        assert_eq!(updated.name, "Annie");
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let pool = create_test_pool();
        let result = UserStore::update(&pool, "US0404", &UserPatch::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_find_by_selectors() {
        let pool = create_test_pool();
        let user = UserStore::create(&pool, &ann()).await.expect("Failed to create user");

        for (field, value) in [
            ("idUser", user.id_user.as_str()),
            ("username", "ann1"),
            ("email", "a@x.com"),
            ("phone", "0123456789"),
        ] {
            let found = UserStore::find_by(&pool, field, value)
                .await
                .expect("Lookup failed");
            assert_eq!(found, Lookup::One(Some(user.clone())));
        }

        let result = UserStore::find_by(&pool, "name", "Ann").await;
        assert!(matches!(result, Err(StoreError::InvalidSelector { .. })));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let pool = create_test_pool();
        let user = UserStore::create(&pool, &ann()).await.expect("Failed to create user");

        let deleted = UserStore::delete(&pool, &user.id_user)
            .await
            .expect("Failed to delete user");
        assert_eq!(deleted, user);

        assert!(UserStore::get(&pool, &user.id_user)
            .await
            .expect("Query failed")
            .is_none());
        assert!(matches!(
            UserStore::delete(&pool, &user.id_user).await,
            Err(StoreError::NotFound { .. })
        ));
    }
}
