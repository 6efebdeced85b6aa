//! Battle configuration.
use std::collections::BTreeMap;

use crate::action::FallbackBands;

/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BattleConfig {
    /// Probability bands used by priority-random targeting once the primary
    /// pool is empty. Whatever the bands leave uncovered resolves to no target.
    pub fallback_bands: FallbackBands,

    /// The caster wins a most-needy selection only if its own need is at least
    /// this multiple of the best other candidate's need.
    pub self_preference_threshold: f64,

    /// Extra stacks imposed by a redirect, keyed by the defender's name.
    pub redirect_bonus: BTreeMap<String, u32>,

    /// Session seed for the host's random source. `None` lets the runtime pick one.
    pub seed: Option<u64>,
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_HEROES_PER_SIDE: usize = 3;
    pub const MAX_CREATURES_PER_HERO: usize = 8;
    pub const MAX_STATUS_EFFECTS: usize = 12;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_HERO_BAND: f64 = 0.5;
    pub const DEFAULT_ALLY_BAND: f64 = 0.3;
    pub const DEFAULT_SELF_PREFERENCE_THRESHOLD: f64 = 1.5;

    pub fn new() -> Self {
        Self {
            fallback_bands: FallbackBands::new(Self::DEFAULT_HERO_BAND, Self::DEFAULT_ALLY_BAND),
            self_preference_threshold: Self::DEFAULT_SELF_PREFERENCE_THRESHOLD,
            redirect_bonus: BTreeMap::new(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_redirect_bonus(mut self, name: impl Into<String>, bonus: u32) -> Self {
        self.redirect_bonus.insert(name.into(), bonus);
        self
    }

    /// Extra redirect stacks granted to a defender with the given name.
    pub fn redirect_bonus_for(&self, name: &str) -> u32 {
        self.redirect_bonus.get(name).copied().unwrap_or(0)
    }

    /// Rejects configurations whose probability bands or thresholds are out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let FallbackBands { hero, ally } = self.fallback_bands;
        if !(0.0..=1.0).contains(&hero) || !(0.0..=1.0).contains(&ally) {
            return Err(ConfigError::BandOutOfRange { hero, ally });
        }
        if hero + ally > 1.0 {
            return Err(ConfigError::BandsExceedOne { total: hero + ally });
        }
        if !self.self_preference_threshold.is_finite() || self.self_preference_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.self_preference_threshold));
        }
        Ok(())
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors reported by [`BattleConfig::validate`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("fallback bands must lie in [0, 1] (hero = {hero}, ally = {ally})")]
    BandOutOfRange { hero: f64, ally: f64 },

    #[error("fallback bands sum to {total}, which exceeds 1")]
    BandsExceedOne { total: f64 },

    #[error("self preference threshold must be a non-negative number, got {0}")]
    InvalidThreshold(f64),
}
