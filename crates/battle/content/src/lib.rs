//! Data-driven battle content.
//!
//! Loaders for the files a battle is assembled from:
//! - Action catalog (RON): immutable [`ActionDefinition`](battle_core::ActionDefinition)s
//! - Battle configuration (TOML): [`BattleConfig`](battle_core::BattleConfig)
//! - Encounters (RON): rosters with charge rates, health, control mode and
//!   strategems expressed as condition lists
//!
//! Content only produces `battle-core` values; wiring them into a running
//! session is the host's job.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ActionCatalog, CombatantSpec, ConfigLoader, ContentFactory, Encounter, EncounterLoader,
    EncounterSpec, LoadResult, StrategemEntry, StrategemSpec,
};

/// Data shipped with this crate.
pub const BUNDLED_DATA_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data");
