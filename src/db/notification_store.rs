/// Per-user notifications and their read state.
use super::models::{EntityKind, NewNotification, Notification, NotificationPatch, User};
use super::record::{self, Keyed, Record};
use super::repository::Repository;
use super::selector::selectors;
use super::validate;
use super::DbPool;
use crate::error::Result;
use rusqlite::{params, Connection, Row};

impl Record for Notification {
    const KIND: EntityKind = EntityKind::Notification;
    const COLUMNS: &'static str = "id_notify, id_user, content, is_read";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Notification {
            id_notify: row.get(0)?,
            id_user: row.get(1)?,
            content: row.get(2)?,
            is_read: row.get(3)?,
        })
    }
}

impl Keyed for Notification {
    const KEY: &'static str = "id_notify";
    const ID_PREFIX: &'static str = "NTF";

    fn id(&self) -> &str {
        &self.id_notify
    }
}

selectors! {
    pub enum NotificationSelector for Notification {
        IdNotify => "idNotify", "id_notify = ?1", One;
        IdUser => "idUser", "id_user = ?1 ORDER BY rowid", Many;
    }
}

/// Notification storage operations
pub struct NotificationStore;

impl NotificationStore {
    fn write(conn: &Connection, notification: &Notification, insert: bool) -> Result<()> {
        let sql = if insert {
            "INSERT INTO notifications (id_notify, id_user, content, is_read) VALUES (?1, ?2, ?3, ?4)"
        } else {
            "UPDATE notifications SET id_user = ?2, content = ?3, is_read = ?4 WHERE id_notify = ?1"
        };
        conn.execute(
            sql,
            params![
                notification.id_notify,
                notification.id_user,
                notification.content,
                notification.is_read,
            ],
        )?;
        Ok(())
    }

    fn for_user(conn: &Connection, id_user: &str) -> Result<Vec<Notification>> {
        record::select_where(conn, "id_user = ?1 ORDER BY rowid", params![id_user])
    }

    pub async fn unread_for_user(pool: &DbPool, id_user: &str) -> Result<Vec<Notification>> {
        pool.with_connection(|conn| {
            record::select_where(
                conn,
                "id_user = ?1 AND is_read = 0 ORDER BY rowid",
                params![id_user],
            )
        })
        .await
    }

    pub async fn mark_read(pool: &DbPool, id_notify: &str) -> Result<Notification> {
        pool.with_transaction(|conn, _| {
            let mut notification = record::reload::<Notification>(conn, id_notify)?;
            if !notification.is_read {
                notification.is_read = true;
                Self::write(conn, &notification, false)?;
            }
            Ok(notification)
        })
        .await
    }

    /// Mark every notification of `id_user` read and return them all
    pub async fn mark_all_read(pool: &DbPool, id_user: &str) -> Result<Vec<Notification>> {
        pool.with_transaction(|conn, _| {
            let changed = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id_user = ?1 AND is_read = 0",
                params![id_user],
            )?;
            log::debug!("Marked {} notifications of {} read", changed, id_user);
            Self::for_user(conn, id_user)
        })
        .await
    }

    /// Delete every notification of `id_user`, returning the removed rows
    pub async fn delete_all_for_user(pool: &DbPool, id_user: &str) -> Result<Vec<Notification>> {
        pool.with_transaction(|conn, _| {
            let removed = Self::for_user(conn, id_user)?;
            conn.execute(
                "DELETE FROM notifications WHERE id_user = ?1",
                params![id_user],
            )?;
            log::info!("Cleared {} notifications of {}", removed.len(), id_user);
            Ok(removed)
        })
        .await
    }
}

impl Repository for NotificationStore {
    type Record = Notification;
    type New = NewNotification;
    type Patch = NotificationPatch;
    type Selector = NotificationSelector;

    async fn create(pool: &DbPool, input: &NewNotification) -> Result<Notification> {
        let notification = pool
            .with_transaction(|conn, ids| {
                validate::require_exists::<User>(conn, &input.id_user)?;

                let notification = Notification {
                    id_notify: ids.generate::<Notification>(conn)?,
                    id_user: input.id_user.clone(),
                    content: input.content.clone(),
                    is_read: input.is_read,
                };
                Self::write(conn, &notification, true)?;
                record::reload::<Notification>(conn, &notification.id_notify)
            })
            .await?;

        log::info!(
            "Created notification {} for {}",
            notification.id_notify,
            notification.id_user
        );
        Ok(notification)
    }

    async fn update(pool: &DbPool, id: &str, patch: &NotificationPatch) -> Result<Notification> {
        pool.with_transaction(|conn, _| {
            let mut notification = record::reload::<Notification>(conn, id)?;
            patch.apply_to(&mut notification);
            Self::write(conn, &notification, false)?;
            Ok(notification)
        })
        .await
    }
}
