//! Simulation scaffolding entities: scenarios, runs, log messages, and
//! synthetic-population placeholders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Population;

/// A configured simulation scenario over one (population, year) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SimulationScenario {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The population the scenario simulates.
    pub population_id: i64,
    /// The starting year of the scenario.
    pub year_id: i64,
    /// Short human-readable description.
    pub short_description: String,
    /// Free-form policy overrides applied on top of the persisted policies
    /// (stored as a `JSONB` column, defaults to `{}`).
    pub additional_policies: serde_json::Value,
    /// Non-owning back-reference to the simulated population.
    #[sqlx(skip)]
    #[serde(skip)]
    pub population: Option<Box<Population>>,
}

/// One execution of a [`SimulationScenario`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SimulationRun {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The executed scenario.
    pub scenario_id: i64,
    /// Overall run status (e.g. `"IN_PROGRESS"`, `"COMPLETED"`).
    pub overall_status: String,
    /// The pipeline stage the run is currently in (e.g. `"DATAPREPARATION"`).
    pub current_stage: String,
    /// The simulated year the run has reached.
    pub current_year_number: i64,
    /// Non-owning back-reference to the scenario.
    #[sqlx(skip)]
    #[serde(skip)]
    pub scenario: Option<Box<SimulationScenario>>,
}

/// A leveled log line emitted by a [`SimulationRun`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LogMessage {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The emitting run.
    pub run_id: i64,
    /// Wall-clock timestamp of the message.
    pub timestamp: DateTime<Utc>,
    /// Emitting component name.
    pub source: String,
    /// Numeric log level (higher is more severe).
    pub log_level: i64,
    /// Message text.
    pub description: String,
}

/// Placeholder row marking that a synthetic population has been derived
/// for a (population, year) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SyntheticPopulation {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The source population.
    pub population_id: i64,
    /// The base year of the synthetic derivation.
    pub year_id: i64,
    /// Name of the synthetic population.
    pub name: String,
    /// Description of the derivation.
    pub description: String,
}
