//! Error types for the persistence layer.
//!
//! Two separate taxonomies, matching the two halves of the repository
//! contract:
//!
//! - [`DbError`] -- read-path and infrastructure failures, propagated to the
//!   caller with `?`.
//! - [`WriteError`] -- the soft-failure contract of every write operation.
//!   Constraint violations and connectivity loss are *expected* outcomes of
//!   a write against a strongly-constrained schema; they are recovered at
//!   the repository boundary and surfaced as values, never as panics and
//!   never as raw [`sqlx`] errors.

use sqlx::error::ErrorKind;

/// Errors on the read path and in the infrastructure layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A single-row query matched more than one row. This signals a
    /// programming or data error and is propagated to the caller.
    #[error("single-row query on `{table}` matched more than one row")]
    MultipleResults {
        /// The table the query ran against.
        table: &'static str,
    },

    /// An `include` named a relation the entity does not define. This is a
    /// programming error and is propagated to the caller.
    #[error("unknown relation `{relation}` for table `{table}`")]
    UnknownRelation {
        /// The table the query ran against.
        table: &'static str,
        /// The unrecognized relation name.
        relation: String,
    },

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Soft failure of a repository write operation.
///
/// Callers decide whether to log and continue (fixture loading), retry, or
/// abort; the repository itself guarantees only that the failure is typed
/// and that nothing panicked.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// A unique-index, foreign-key, not-null or check constraint rejected
    /// the write. At most the already-committed portion of the operation
    /// persists.
    #[error("constraint violated ({}): {message}", .constraint.as_deref().unwrap_or("unnamed"))]
    Constraint {
        /// Name of the violated constraint, when the store reports one.
        constraint: Option<String>,
        /// Store-provided failure message.
        message: String,
    },

    /// The store was unreachable or the connection was lost mid-operation.
    #[error("store unreachable: {message}")]
    Connectivity {
        /// Underlying connectivity failure message.
        message: String,
    },

    /// A bulk insert stopped at a failing row. Everything inserted before
    /// that row (earlier batches in full, plus the leading rows of the
    /// failing batch) is already committed and is NOT rolled back: callers
    /// must treat this as "a prefix of the input may already be persisted".
    #[error("bulk insert stopped at batch {batch_index} ({committed} rows committed): {source}")]
    BatchFailed {
        /// Zero-based index of the failing batch.
        batch_index: usize,
        /// Number of rows committed before the failure.
        committed: usize,
        /// The classified failure of the row itself.
        #[source]
        source: Box<WriteError>,
    },

    /// A bulk update affected fewer rows than requested. The applied subset
    /// stays committed.
    #[error("bulk update affected {affected} of {expected} rows")]
    PartialApplication {
        /// Number of rows the caller asked to update.
        expected: u64,
        /// Number of rows the store actually changed.
        affected: u64,
    },

    /// Any other store-level failure.
    #[error("storage error: {message}")]
    Other {
        /// Store-provided failure message.
        message: String,
    },
}

impl WriteError {
    /// Classify a raw [`sqlx::Error`] into the soft-failure taxonomy.
    ///
    /// Constraint-kind database errors become [`WriteError::Constraint`],
    /// transport-level failures become [`WriteError::Connectivity`], and
    /// everything else is carried through as [`WriteError::Other`].
    pub fn classify(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Database(db) => match db.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => Self::Constraint {
                    constraint: db.constraint().map(str::to_owned),
                    message: db.message().to_owned(),
                },
                _ => Self::Other {
                    message: db.message().to_owned(),
                },
            },
            sqlx::Error::Io(e) => Self::Connectivity {
                message: e.to_string(),
            },
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => Self::Connectivity {
                message: error.to_string(),
            },
            other => Self::Other {
                message: other.to_string(),
            },
        }
    }

    /// Whether this failure (or, for a stopped bulk insert, its cause) is a
    /// constraint violation.
    pub fn is_constraint(&self) -> bool {
        match self {
            Self::Constraint { .. } => true,
            Self::BatchFailed { source, .. } => source.is_constraint(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_failed_reports_committed_prefix() {
        let inner = WriteError::Constraint {
            constraint: Some(String::from("ux_years_number_population")),
            message: String::from("duplicate key value"),
        };
        let err = WriteError::BatchFailed {
            batch_index: 1,
            committed: 2,
            source: Box::new(inner),
        };
        let text = err.to_string();
        assert!(text.contains("batch 1"));
        assert!(text.contains("2 rows committed"));
        assert!(err.is_constraint());
    }

    #[test]
    fn partial_application_message_counts() {
        let err = WriteError::PartialApplication {
            expected: 5,
            affected: 3,
        };
        assert_eq!(err.to_string(), "bulk update affected 3 of 5 rows");
        assert!(!err.is_constraint());
    }
}
