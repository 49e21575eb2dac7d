//! AgriData service entry point.
//!
//! The server wires the persistence layer together at process start: it
//! loads configuration, connects the `PostgreSQL` pool, runs the bootstrap
//! sequence (schema migrations with retry, FADN catalog, optional fixture
//! synthesizer), then waits for shutdown.
//!
//! # Architecture
//!
//! ```text
//! agridata-config.yaml --> PgStore --> bootstrap::initialize --> ready
//! ```
//!
//! HTTP controllers and other collaborators attach to the same store from
//! their own processes; this binary owns schema and fixture lifecycle only.

mod config;

use std::path::Path;
use std::time::Duration;

use agridata_db::{PgStore, PgStoreConfig};
use agridata_seeder::{bootstrap, BootstrapOptions, BootstrapSequencer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Default location of the YAML configuration file.
const CONFIG_PATH: &str = "agridata-config.yaml";

/// Application entry point.
///
/// Initializes logging, loads configuration, connects to `PostgreSQL`,
/// runs the bootstrap sequence, then blocks until ctrl-c.
///
/// # Errors
///
/// Returns an error if configuration parsing, the initial connection, or
/// the bootstrap sequence fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("agridata-server starting");

    // Load configuration; a missing file means defaults
    let config_path = Path::new(CONFIG_PATH);
    let config = if config_path.exists() {
        AppConfig::from_file(config_path)?
    } else {
        warn!(path = CONFIG_PATH, "config file not found, using defaults");
        AppConfig::parse("")?
    };
    info!(
        mode = ?config.mode,
        seeder_enabled = config.seeder.enabled,
        max_connections = config.database.max_connections,
        "configuration loaded"
    );

    // Connect the pool
    let store_config = PgStoreConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections)
        .with_connect_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .with_idle_timeout(Duration::from_secs(config.database.idle_timeout_secs));
    let store = PgStore::connect(&store_config).await?;

    // Migrations, catalog, and (in development) synthetic fixtures
    let options = BootstrapOptions {
        development: config.is_development(),
        seed_fixtures: config.seeder.enabled,
        synthesizer: config.seeder.synthesizer,
    };
    bootstrap::initialize(&store, &BootstrapSequencer::default(), &options).await?;

    info!("agridata-server ready");

    // Block until shutdown is requested
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    store.close().await;

    Ok(())
}
