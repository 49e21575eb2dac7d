//! The generic repository, instantiated once per entity type.
//!
//! Read operations take a [`Query`] and return detached row snapshots;
//! write operations return the soft-failure [`WriteError`] contract
//! described in [`crate::error`]. Every operation checks a connection out
//! of the pool for the duration of a single statement (or one batch
//! transaction) and returns it on every exit path.

use std::marker::PhantomData;

use tracing::debug;

use crate::entity::Entity;
use crate::error::{DbError, WriteError};
use crate::query::{render_insert, render_update, Filter, Query};
use crate::store::PgStore;
use crate::value::{bind_query, bind_query_as, SqlValue};

/// Generic data access for one entity type.
///
/// Cheap to construct and to clone; holds only a pool handle.
#[derive(Clone)]
pub struct Repository<T: Entity> {
    store: PgStore,
    marker: PhantomData<fn() -> T>,
}

impl<T: Entity> Repository<T> {
    /// Create a repository over `store`.
    pub const fn new(store: PgStore) -> Self {
        Self {
            store,
            marker: PhantomData,
        }
    }

    /// Count the rows matching `filter` (all rows when `None`).
    ///
    /// The predicate is evaluated by the store; no rows are transferred.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn count(&self, filter: Option<&Filter>) -> Result<i64, DbError> {
        let mut args = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", T::TABLE);
        if let Some(filter) = filter {
            let clause = filter.render(&mut args);
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }

        let mut statement = sqlx::query_as::<_, (i64,)>(&sql);
        for value in args {
            statement = bind_query_as(statement, value);
        }
        let (count,) = statement.fetch_one(self.store.pool()).await?;
        Ok(count)
    }

    /// Fetch every row matching `query`, then run one follow-up statement
    /// per requested include.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnknownRelation`] if an include names a relation
    /// the entity does not declare, or [`DbError::Postgres`] if a statement
    /// fails.
    pub async fn get_all(&self, query: &Query) -> Result<Vec<T>, DbError> {
        let (sql, args) = query.render_select(T::TABLE);
        if query.debug {
            debug!(table = T::TABLE, sql = %sql, binds = args.len(), "executing query");
        }

        let mut statement = sqlx::query_as::<_, T>(&sql);
        for value in args {
            statement = bind_query_as(statement, value);
        }
        let mut rows = statement.fetch_all(self.store.pool()).await?;

        for relation in &query.include {
            T::load_related(self.store.pool(), relation, &mut rows).await?;
        }
        Ok(rows)
    }

    /// Fetch the single row matching `query`, or `None` when no row
    /// matches.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::MultipleResults`] when more than one row matches;
    /// an ambiguous single-row read is a programming or data error, never
    /// silently resolved by picking a row.
    pub async fn get_single_or_default(&self, query: &Query) -> Result<Option<T>, DbError> {
        // Two rows are enough to detect ambiguity.
        let probe = query.clone().take(2);
        let mut rows = self.get_all(&probe).await?;
        if rows.len() > 1 {
            return Err(DbError::MultipleResults { table: T::TABLE });
        }
        Ok(rows.pop())
    }

    /// Insert one record and write the store-assigned identifier back into
    /// it.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Constraint`] when the schema rejects the row,
    /// [`WriteError::Connectivity`] when the store is unreachable.
    pub async fn add(&self, entity: &mut T) -> Result<(), WriteError> {
        let sql = render_insert(T::TABLE, T::INSERT_COLUMNS);
        let mut statement = sqlx::query_as::<_, (i64,)>(&sql);
        for value in entity.insert_values() {
            statement = bind_query_as(statement, value);
        }
        let (id,) = statement
            .fetch_one(self.store.pool())
            .await
            .map_err(WriteError::classify)?;
        entity.set_id(id);
        Ok(())
    }

    /// Insert `entities` in input order, `batch_size` rows at a time, each
    /// batch in its own transaction with per-row savepoints.
    ///
    /// `batch_size == 0` means a single batch. Store-assigned identifiers
    /// are written back into the inserted records.
    ///
    /// # Errors
    ///
    /// Stops at the first failing row and returns
    /// [`WriteError::BatchFailed`]. Everything inserted before that row
    /// stays committed: earlier batches in full, plus the leading rows of
    /// the failing batch (the failing row itself rolls back to its
    /// savepoint). Later rows are never attempted. Callers must treat the
    /// failure as "a prefix of the input may already be persisted".
    pub async fn add_range(
        &self,
        entities: &mut [T],
        batch_size: usize,
    ) -> Result<(), WriteError> {
        if entities.is_empty() {
            return Ok(());
        }
        let chunk = if batch_size == 0 {
            entities.len()
        } else {
            batch_size
        };

        let mut committed = 0usize;
        for (batch_index, batch) in entities.chunks_mut(chunk).enumerate() {
            match self.insert_batch(batch).await {
                Ok(inserted) => committed += inserted,
                Err((inserted, source)) => {
                    return Err(WriteError::BatchFailed {
                        batch_index,
                        committed: committed + inserted,
                        source: Box::new(source),
                    });
                }
            }
        }
        Ok(())
    }

    /// Insert one batch inside one transaction, one savepoint per row, so
    /// a failing row leaves the rows before it committed.
    ///
    /// Returns the number of rows inserted; on failure that count travels
    /// with the classified error.
    async fn insert_batch(&self, batch: &mut [T]) -> Result<usize, (usize, WriteError)> {
        use sqlx::Acquire;

        let sql = render_insert(T::TABLE, T::INSERT_COLUMNS);
        let mut tx = self
            .store
            .pool()
            .begin()
            .await
            .map_err(|e| (0, WriteError::classify(e)))?;

        let mut inserted = 0usize;
        for entity in batch.iter_mut() {
            let mut savepoint = tx
                .begin()
                .await
                .map_err(|e| (inserted, WriteError::classify(e)))?;
            let mut statement = sqlx::query_as::<_, (i64,)>(&sql);
            for value in entity.insert_values() {
                statement = bind_query_as(statement, value);
            }
            match statement.fetch_one(&mut *savepoint).await {
                Ok((id,)) => {
                    savepoint
                        .commit()
                        .await
                        .map_err(|e| (inserted, WriteError::classify(e)))?;
                    entity.set_id(id);
                    inserted += 1;
                }
                Err(error) => {
                    // Keep the rows before the failure: roll back only the
                    // failing row, then commit the partial batch.
                    let write_error = WriteError::classify(error);
                    savepoint
                        .rollback()
                        .await
                        .map_err(|e| (inserted, WriteError::classify(e)))?;
                    tx.commit()
                        .await
                        .map_err(|e| (inserted, WriteError::classify(e)))?;
                    return Err((inserted, write_error));
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| (inserted, WriteError::classify(e)))?;
        Ok(inserted)
    }

    /// Overwrite the stored row for `entity` with its current field values.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::PartialApplication`] with `affected == 0` when
    /// no stored row carries the entity's identifier.
    pub async fn update(&self, entity: &T) -> Result<(), WriteError> {
        let affected = self.update_one(entity).await?;
        if affected == 0 {
            return Err(WriteError::PartialApplication {
                expected: 1,
                affected: 0,
            });
        }
        Ok(())
    }

    /// Overwrite the stored rows for `entities`, one statement per record.
    ///
    /// # Errors
    ///
    /// Stops at the first statement failure (earlier updates stay
    /// committed). Returns [`WriteError::PartialApplication`] when some
    /// identifiers matched no stored row; the matched subset stays applied.
    pub async fn update_range(&self, entities: &[T]) -> Result<(), WriteError> {
        let mut affected = 0u64;
        for entity in entities {
            affected += self.update_one(entity).await?;
        }
        let expected = u64::try_from(entities.len()).unwrap_or(u64::MAX);
        if affected < expected {
            return Err(WriteError::PartialApplication { expected, affected });
        }
        Ok(())
    }

    async fn update_one(&self, entity: &T) -> Result<u64, WriteError> {
        let sql = render_update(T::TABLE, T::INSERT_COLUMNS);
        let mut statement = sqlx::query(&sql);
        for value in entity.insert_values() {
            statement = bind_query(statement, value);
        }
        statement = bind_query(statement, SqlValue::BigInt(entity.id()));
        let result = statement
            .execute(self.store.pool())
            .await
            .map_err(WriteError::classify)?;
        Ok(result.rows_affected())
    }

    /// Delete the stored row carrying the entity's identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::PartialApplication`] with `affected == 0` when
    /// no such row exists.
    pub async fn remove(&self, entity: &T) -> Result<(), WriteError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(entity.id())
            .execute(self.store.pool())
            .await
            .map_err(WriteError::classify)?;
        if result.rows_affected() == 0 {
            return Err(WriteError::PartialApplication {
                expected: 1,
                affected: 0,
            });
        }
        Ok(())
    }

    /// Delete the stored rows carrying the entities' identifiers, in one
    /// statement.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::PartialApplication`] when some identifiers
    /// matched no stored row; the matched subset stays deleted.
    pub async fn remove_range(&self, entities: &[T]) -> Result<(), WriteError> {
        if entities.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = entities.iter().map(Entity::id).collect();
        let expected = u64::try_from(ids.len()).unwrap_or(u64::MAX);
        let sql = format!("DELETE FROM {} WHERE id = ANY($1)", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(&ids)
            .execute(self.store.pool())
            .await
            .map_err(WriteError::classify)?;
        let affected = result.rows_affected();
        if affected < expected {
            return Err(WriteError::PartialApplication { expected, affected });
        }
        Ok(())
    }

    /// Delete every row of the entity's table and return the number of
    /// rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`WriteError::Constraint`] when dependent rows in another
    /// table still reference this one.
    pub async fn delete_all(&self) -> Result<u64, WriteError> {
        let sql = format!("DELETE FROM {}", T::TABLE);
        let result = sqlx::query(&sql)
            .execute(self.store.pool())
            .await
            .map_err(WriteError::classify)?;
        Ok(result.rows_affected())
    }
}
