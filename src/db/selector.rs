/// Generic "find by named field" lookup.
///
/// Each entity kind declares a closed set of queryable fields with
/// [`selectors!`]. An incoming field name is parsed into that set before any
/// SQL is built, so unknown names fail with `InvalidSelector` and the name
/// itself never reaches a query string.
use super::record::{self, Record};
use crate::error::{Result, StoreError};
use rusqlite::{params, Connection};
use serde::Serialize;

/// Whether a selector identifies at most one row or a set of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    Many,
}

pub trait Selector: Copy + Sized + 'static {
    type Record: Record;

    const ALL: &'static [Self];

    /// Public field name as used by clients, e.g. `idUser`
    fn field(self) -> &'static str;

    /// SQL filter with the looked-up value bound as `?1`
    fn filter(self) -> &'static str;

    fn cardinality(self) -> Cardinality;

    fn parse(field: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|selector| selector.field() == field)
            .ok_or_else(|| StoreError::InvalidSelector {
                kind: Self::Record::KIND,
                field: field.to_string(),
            })
    }
}

/// Result of a selector lookup
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Lookup<T> {
    One(Option<T>),
    Many(Vec<T>),
}

impl<T> Lookup<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Lookup::One(record) => record.into_iter().collect(),
            Lookup::Many(records) => records,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Lookup::One(record) => record.is_none(),
            Lookup::Many(records) => records.is_empty(),
        }
    }
}

/// Parse `field` for selector set `S` and run the lookup
pub fn find_by<S: Selector>(conn: &Connection, field: &str, value: &str) -> Result<Lookup<S::Record>> {
    let selector = S::parse(field)?;
    find_with(conn, selector, value)
}

/// Run a lookup for an already-parsed selector
pub fn find_with<S: Selector>(conn: &Connection, selector: S, value: &str) -> Result<Lookup<S::Record>> {
    match selector.cardinality() {
        Cardinality::One => Ok(Lookup::One(record::select_one_where(
            conn,
            selector.filter(),
            params![value],
        )?)),
        Cardinality::Many => Ok(Lookup::Many(record::select_where(
            conn,
            selector.filter(),
            params![value],
        )?)),
    }
}

/// Declare the closed selector set of one record type.
///
/// Each line maps a variant to its public field name, a static SQL filter
/// and its cardinality.
macro_rules! selectors {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident for $record:ty {
            $($variant:ident => $field:literal, $filter:literal, $card:ident;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::db::selector::Selector for $name {
            type Record = $record;

            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn field(self) -> &'static str {
                match self {
                    $($name::$variant => $field),+
                }
            }

            fn filter(self) -> &'static str {
                match self {
                    $($name::$variant => $filter),+
                }
            }

            fn cardinality(self) -> $crate::db::selector::Cardinality {
                match self {
                    $($name::$variant => $crate::db::selector::Cardinality::$card),+
                }
            }
        }
    };
}

pub(crate) use selectors;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use crate::db::models::{EntityKind, Place};
    use crate::db::place_store::PlaceSelector;
    use crate::db::user_store::UserSelector;

    fn insert_place(conn: &Connection, id: &str, city: &str) {
        conn.execute(
            "INSERT INTO places (id_place, name, country, city, address, rating, place_type)
             VALUES (?1, 'Spot', 'Vietnam', ?2, 'Somewhere', 4, 2)",
            params![id, city],
        )
        .expect("Failed to insert place");
    }

    #[test]
    fn test_parse_known_and_unknown_fields() {
        assert_eq!(UserSelector::parse("username").unwrap(), UserSelector::Username);
        assert_eq!(PlaceSelector::parse("type").unwrap(), PlaceSelector::Type);

        match UserSelector::parse("password") {
            Err(StoreError::InvalidSelector { kind, field }) => {
                assert_eq!(kind, EntityKind::User);
                assert_eq!(field, "password");
            }
            other => panic!("Unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_injection_attempt_is_rejected() {
        let result = UserSelector::parse("username = '' OR 1=1 --");
        assert!(matches!(result, Err(StoreError::InvalidSelector { .. })));
    }

    #[tokio::test]
    async fn test_list_selector_returns_all_matches() {
        let pool = create_test_pool();

        let (hue, hanoi) = pool
            .with_connection(|conn| {
                insert_place(conn, "PL0001", "Hue");
                insert_place(conn, "PL0002", "Hue");
                insert_place(conn, "PL0003", "Da Nang");
                Ok((
                    find_by::<PlaceSelector>(conn, "city", "Hue")?,
                    find_by::<PlaceSelector>(conn, "city", "Hanoi")?,
                ))
            })
            .await
            .expect("Lookup failed");

        let ids: Vec<String> = hue.into_vec().into_iter().map(|p: Place| p.id_place).collect();
        assert_eq!(ids, vec!["PL0001", "PL0002"]);
        assert_eq!(hanoi, Lookup::Many(Vec::new()));
    }

    #[tokio::test]
    async fn test_numeric_selector_matches_text_value() {
        let pool = create_test_pool();

        let found = pool
            .with_connection(|conn| {
                insert_place(conn, "PL0001", "Hue");
                find_by::<PlaceSelector>(conn, "rating", "4")
            })
            .await
            .expect("Lookup failed");

        assert_eq!(found.into_vec().len(), 1);
    }

    #[tokio::test]
    async fn test_key_selector_returns_single_optional() {
        let pool = create_test_pool();

        let (found, missing) = pool
            .with_connection(|conn| {
                insert_place(conn, "PL0001", "Hue");
                Ok((
                    find_by::<PlaceSelector>(conn, "idPlace", "PL0001")?,
                    find_by::<PlaceSelector>(conn, "idPlace", "PL0404")?,
                ))
            })
            .await
            .expect("Lookup failed");

        assert!(matches!(found, Lookup::One(Some(_))));
        assert_eq!(missing, Lookup::One(None));
        assert!(missing.is_empty());
    }

    #[test]
    fn test_lookup_serializes_untagged() {
        let one: Lookup<i32> = Lookup::One(None);
        let many = Lookup::Many(vec![1, 2]);

        assert_eq!(serde_json::to_string(&one).unwrap(), "null");
        assert_eq!(serde_json::to_string(&many).unwrap(), "[1,2]");
    }
}
