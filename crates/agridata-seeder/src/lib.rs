//! Fixture seeding and startup sequencing for the Agridata platform.
//!
//! Two responsibilities:
//!
//! - The **relational graph synthesizer** ([`synthesizer::Synthesizer`]):
//!   an ordered, best-effort pipeline that extends the persisted entity
//!   graph with a consistent, de-duplicated synthetic dataset, driven by a
//!   seedable random source for reproducibility.
//! - The **bootstrap sequencer** ([`bootstrap`]): a small state machine
//!   that retries schema migration until the store is reachable, then
//!   initializes the FADN catalog and, in development, runs the
//!   synthesizer behind an enable flag and an already-seeded check.
//!
//! ```text
//! bootstrap::initialize
//!     |-- BootstrapSequencer      migrate, retry until Ready
//!     |-- catalog                 idempotent FADN reference data
//!     +-- Synthesizer             staged synthetic entity graph
//! ```

pub mod bootstrap;
pub mod catalog;
pub mod error;
pub mod synthesizer;

pub use bootstrap::{BootstrapOptions, BootstrapSequencer, BootstrapState, SchemaMigrator};
pub use error::BootstrapError;
pub use synthesizer::{SeedSummary, Synthesizer, SynthesizerConfig};
