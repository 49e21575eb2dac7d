//! Typed persistence layer for the Agridata simulation platform.
//!
//! `PostgreSQL` holds the full relational entity graph (populations, farms,
//! years, product groups, policies, productions, subsidies, simulation
//! scaffolding). This crate provides a uniform repository abstraction over
//! that graph, instantiated once per entity type, plus entity-specific
//! grouped aggregations layered on top.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time checked)
//! to avoid requiring a live database at build time. All queries are
//! parameterized to prevent SQL injection.
//!
//! # Architecture
//!
//! ```text
//! callers (services, seeder)
//!     |
//!     +-- Repository<T>        generic CRUD + composable Query
//!     |       |-- Query        filter / order / include / take / skip
//!     |       +-- Entity       table metadata + bind values per type
//!     +-- aggregates           population-scoped GROUP BY statistics
//!     |
//!     +-- PgStore              connection pool + embedded migrations
//! ```
//!
//! # Failure contract
//!
//! Read operations return [`DbError`]. Write operations translate every
//! store-level failure (unique/foreign-key violations, connectivity loss)
//! into a typed [`WriteError`] at the repository boundary. Expected
//! persistence failures are values, never panics, and raw [`sqlx`] errors
//! never escape a write path.
//!
//! # Modules
//!
//! - [`store`] -- `PostgreSQL` connection pool and configuration
//! - [`entity`] -- the [`Entity`] and [`NaturalKey`] traits
//! - [`query`] -- composable typed query builder and SQL rendering
//! - [`value`] -- owned bind-value representation
//! - [`repository`] -- the generic repository
//! - [`aggregates`] -- extended, entity-specific aggregation repositories
//! - [`error`] -- shared error types

pub mod aggregates;
pub mod entity;
mod entity_impls;
pub mod error;
pub mod query;
pub mod repository;
pub mod store;
pub mod value;

pub use aggregates::{
    AgriculturalProductionStats, FarmYearSubsidyStats, LivestockProductionStats,
};
pub use entity::{Entity, NaturalKey};
pub use entity_impls::relations;
pub use error::{DbError, WriteError};
pub use query::{Direction, Filter, Order, Query};
pub use repository::Repository;
pub use store::{PgStore, PgStoreConfig};
pub use value::SqlValue;
