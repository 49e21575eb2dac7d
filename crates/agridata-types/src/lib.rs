//! Entity model for the Agridata agricultural simulation platform.
//!
//! This crate defines the relational entity graph persisted by
//! `agridata-db`: populations, farms, years, product groups, policies, the
//! FADN product catalog, per-(farm, year) records, and the simulation
//! scaffolding (scenarios, runs, log messages).
//!
//! Every entity carries a store-assigned `i64` surrogate identifier
//! (`0` until persisted) and plain `i64` foreign-key columns. Children
//! additionally hold an optional, non-owning back-reference to their parent
//! that is populated only by an explicit eager-load and never used for
//! ownership. Ownership flows strictly parent to child through the store's
//! cascading foreign keys.
//!
//! # Modules
//!
//! - [`ids`] -- type-safe identifier newtypes around `i64`
//! - [`enums`] -- enumeration types (`ProductType`)
//! - [`entities`] -- the core domain entity graph
//! - [`simulation`] -- simulation scenario/run/log scaffolding

pub mod entities;
pub mod enums;
pub mod ids;
pub mod simulation;

pub use entities::{
    AgriculturalProduction, AgroManagementDecision, ClosingValFarmValue, FadnProduct,
    FadnProductRelation, Farm, FarmYearSubsidy, GreeningFarmYearData, HolderFarmYearData,
    LandRent, LandTransaction, LivestockProduction, Policy, PolicyGroupRelation, Population,
    ProductGroup, Year,
};
pub use enums::ProductType;
pub use ids::{FadnProductId, FarmId, PolicyId, PopulationId, ProductGroupId, YearId};
pub use simulation::{LogMessage, SimulationRun, SimulationScenario, SyntheticPopulation};
