//! Data-driven battle content and loaders.
//!
//! This crate houses the static content a battle is built from:
//! - Ability profiles (RON, embedded or read from a path)
//! - Battle configuration (TOML)
//! - Demo rosters (RON)
//!
//! Content feeds `battle-core` oracles and configuration; it never appears in
//! replicated outcomes.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    AbilityTableLoader, ConfigLoader, ContentFactory, CreatureSpec, HeroSpec, RosterLoader,
    RosterSpec,
};
