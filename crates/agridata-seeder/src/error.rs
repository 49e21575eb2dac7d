//! Error types for bootstrap and fixture seeding.

use agridata_db::{DbError, WriteError};

/// Errors raised while bringing the store up and loading fixtures.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The migration retry loop hit its configured attempt limit. Only
    /// reachable when a maximum is set; the production default retries
    /// forever.
    #[error("store never became ready after {attempts} migration attempts")]
    AttemptsExhausted {
        /// Number of attempts made before giving up.
        attempts: u32,
    },

    /// A read-path or infrastructure error from the persistence layer.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A write against the store failed.
    #[error(transparent)]
    Write(#[from] WriteError),
}
