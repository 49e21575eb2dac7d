//! Startup sequencing: migrate, then initialize reference and fixture data.
//!
//! The sequencer is a two-state machine. In `AwaitingConnection` it
//! attempts a schema migration; on failure it logs, sleeps a fixed
//! interval and tries again. By default it retries forever: the process is
//! assumed to be a container waiting for a co-scheduled store, and
//! blocking every dependent startup step until the store is reachable is
//! the intended behavior (no backoff, no cancellation path). Tests inject
//! a short interval and an attempt limit.

use std::time::Duration;

use agridata_db::{DbError, PgStore, Repository};
use agridata_types::Population;
use tracing::{info, warn};

use crate::catalog;
use crate::error::BootstrapError;
use crate::synthesizer::{Synthesizer, SynthesizerConfig};

/// Anything that can bring the schema up to date.
///
/// Implemented by [`PgStore`]; tests substitute a mock that fails a set
/// number of times.
#[allow(async_fn_in_trait)]
pub trait SchemaMigrator {
    /// Apply all pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] when the store is unreachable or a migration
    /// fails.
    async fn migrate(&self) -> Result<(), DbError>;
}

impl SchemaMigrator for PgStore {
    async fn migrate(&self) -> Result<(), DbError> {
        self.run_migrations().await
    }
}

/// States of the startup sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    /// The store has not accepted a migration yet.
    AwaitingConnection,
    /// Migration succeeded; dependent initialization may proceed.
    Ready,
}

/// Default sleep between migration attempts.
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 5;

/// Retrying migration driver.
#[derive(Debug, Clone)]
pub struct BootstrapSequencer {
    retry_interval: Duration,
    max_attempts: Option<u32>,
}

impl Default for BootstrapSequencer {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
            max_attempts: None,
        }
    }
}

impl BootstrapSequencer {
    /// Create a sequencer with an explicit interval and attempt limit
    /// (`None` retries forever, the production default).
    pub const fn new(retry_interval: Duration, max_attempts: Option<u32>) -> Self {
        Self {
            retry_interval,
            max_attempts,
        }
    }

    /// Drive the state machine until the store accepts a migration.
    ///
    /// Blocks the caller for as long as the store stays unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::AttemptsExhausted`] only when an attempt
    /// limit is configured and reached.
    pub async fn wait_for_store<M: SchemaMigrator>(
        &self,
        migrator: &M,
    ) -> Result<BootstrapState, BootstrapError> {
        let mut state = BootstrapState::AwaitingConnection;
        let mut attempts = 0u32;
        while state == BootstrapState::AwaitingConnection {
            attempts += 1;
            match migrator.migrate().await {
                Ok(()) => {
                    info!(attempts, "store ready, schema migrated");
                    state = BootstrapState::Ready;
                }
                Err(error) => {
                    warn!(attempts, %error, "store not ready, retrying");
                    if let Some(limit) = self.max_attempts
                        && attempts >= limit
                    {
                        return Err(BootstrapError::AttemptsExhausted { attempts });
                    }
                    tokio::time::sleep(self.retry_interval).await;
                }
            }
        }
        Ok(state)
    }
}

/// What `initialize` is allowed to do beyond migrating.
#[derive(Debug, Clone, Default)]
pub struct BootstrapOptions {
    /// Development deployments may load synthetic fixtures.
    pub development: bool,
    /// Explicit enable flag for the synthesizer.
    pub seed_fixtures: bool,
    /// Knobs handed to the synthesizer when it runs.
    pub synthesizer: SynthesizerConfig,
}

/// Full startup initialization, invoked exactly once at process start.
///
/// Waits for the store, initializes the FADN catalog, then runs the
/// synthesizer when the deployment is development, the enable flag is set
/// and the store holds no population yet (already-seeded check).
///
/// # Errors
///
/// Returns [`BootstrapError`] if the sequencer gives up, the catalog
/// cannot be initialized, or the synthesizer cannot read the store.
pub async fn initialize(
    store: &PgStore,
    sequencer: &BootstrapSequencer,
    options: &BootstrapOptions,
) -> Result<(), BootstrapError> {
    sequencer.wait_for_store(store).await?;

    let inserted = catalog::ensure_fadn_catalog(store).await?;
    info!(inserted, "FADN catalog ready");

    if !options.development || !options.seed_fixtures {
        info!("fixture seeding disabled");
        return Ok(());
    }
    let populations = Repository::<Population>::new(store.clone())
        .count(None)
        .await?;
    if populations > 0 {
        info!(populations, "store already seeded, skipping synthesizer");
        return Ok(());
    }

    let mut synthesizer = Synthesizer::new(store.clone(), options.synthesizer.clone());
    let summary = synthesizer.initialize_development_fixtures().await?;
    info!(
        total_inserted = summary.total_inserted(),
        failed_stages = ?summary.failed_stages,
        "development fixtures loaded"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    /// Fails the first `failures` migration calls, then succeeds.
    struct FlakyMigrator {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyMigrator {
        const fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }
    }

    impl SchemaMigrator for FlakyMigrator {
        async fn migrate(&self) -> Result<(), DbError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(DbError::Config("store not ready".to_owned()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn reaches_ready_after_transient_failures() {
        let migrator = FlakyMigrator::new(3);
        let sequencer = BootstrapSequencer::new(Duration::from_millis(1), None);
        let state = sequencer
            .wait_for_store(&migrator)
            .await
            .expect("sequencer must converge");
        assert_eq!(state, BootstrapState::Ready);
        assert_eq!(migrator.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn gives_up_when_attempt_limit_is_reached() {
        let migrator = FlakyMigrator::new(u32::MAX);
        let sequencer = BootstrapSequencer::new(Duration::from_millis(1), Some(3));
        let error = sequencer
            .wait_for_store(&migrator)
            .await
            .expect_err("sequencer must give up");
        assert!(matches!(
            error,
            BootstrapError::AttemptsExhausted { attempts: 3 }
        ));
        assert_eq!(migrator.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_immediately_when_store_is_ready() {
        let migrator = FlakyMigrator::new(0);
        let sequencer = BootstrapSequencer::default();
        let state = sequencer
            .wait_for_store(&migrator)
            .await
            .expect("sequencer must converge");
        assert_eq!(state, BootstrapState::Ready);
        assert_eq!(migrator.calls.load(Ordering::SeqCst), 1);
    }
}
