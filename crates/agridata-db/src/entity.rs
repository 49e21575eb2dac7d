//! The [`Entity`] and [`NaturalKey`] traits.
//!
//! `Entity` is the seam between the generic repository and the concrete
//! record types: it supplies the table name, the insert column list, access
//! to the surrogate identifier, the ordered bind values of a record, and
//! relation loading for eager includes. One implementation exists per
//! entity type (see `entity_impls`), which is what lets a single repository
//! implementation serve the whole entity graph.
//!
//! `NaturalKey` captures the composite-uniqueness invariant of an entity
//! kind as a hashable key plus an equivalent store-side predicate. The
//! synthesizer's two-level de-duplication and the round-trip tests are
//! built on it.

use std::collections::{BTreeSet, HashMap};

use sqlx::postgres::PgRow;
use sqlx::PgPool;

use crate::error::DbError;
use crate::query::Filter;
use crate::value::SqlValue;

/// A persistable record type with a store-assigned `i64` identifier.
#[allow(async_fn_in_trait)]
pub trait Entity:
    Clone + Send + Sync + Unpin + std::fmt::Debug + for<'r> sqlx::FromRow<'r, PgRow>
{
    /// Table this entity is stored in.
    const TABLE: &'static str;

    /// Columns written on insert and update, in bind order. Excludes `id`,
    /// which the store assigns.
    const INSERT_COLUMNS: &'static [&'static str];

    /// The surrogate identifier (`0` until persisted).
    fn id(&self) -> i64;

    /// Record the store-assigned identifier after an insert.
    fn set_id(&mut self, id: i64);

    /// The record's values in [`Self::INSERT_COLUMNS`] order.
    fn insert_values(&self) -> Vec<SqlValue>;

    /// Eager-load the named parent relation into the back-reference fields
    /// of `rows`.
    ///
    /// The default implementation rejects every relation name; entities
    /// with declared relations override it.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownRelation`] for undeclared names.
    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        let _ = (pool, rows);
        Err(DbError::UnknownRelation {
            table: Self::TABLE,
            relation: relation.to_owned(),
        })
    }
}

/// The composite-uniqueness invariant of an entity kind.
pub trait NaturalKey: Entity {
    /// The natural-key value, comparable and hashable in memory.
    type Key: Clone + Eq + std::hash::Hash + Send;

    /// Extract this record's natural key.
    fn natural_key(&self) -> Self::Key;

    /// A store-side predicate matching exactly the rows with `key`.
    fn key_filter(key: &Self::Key) -> Filter;
}

/// Batch-load the parents referenced by `rows` and attach them to the
/// back-reference field selected by `set`.
///
/// One `WHERE id IN (...)` statement per relation, regardless of row count
/// (includes always run as split queries).
pub(crate) async fn attach_parent<C, P>(
    pool: &PgPool,
    rows: &mut [C],
    foreign_key: impl Fn(&C) -> i64,
    set: impl Fn(&mut C, P),
) -> Result<(), DbError>
where
    P: Entity,
{
    let ids: Vec<i64> = rows
        .iter()
        .map(&foreign_key)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if ids.is_empty() {
        return Ok(());
    }

    let sql = format!("SELECT * FROM {} WHERE id = ANY($1)", P::TABLE);
    let parents: Vec<P> = sqlx::query_as(&sql).bind(&ids).fetch_all(pool).await?;
    let by_id: HashMap<i64, P> = parents
        .into_iter()
        .map(|parent| (parent.id(), parent))
        .collect();

    for row in rows.iter_mut() {
        if let Some(parent) = by_id.get(&foreign_key(row)) {
            set(row, parent.clone());
        }
    }
    Ok(())
}
