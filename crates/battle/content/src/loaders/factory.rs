//! Content factory for loading a whole battle from a data directory.

use std::path::{Path, PathBuf};

use battle_core::{AbilityTable, BattleConfig};

use crate::loaders::{AbilityTableLoader, ConfigLoader, LoadResult, RosterLoader, RosterSpec};

/// Content factory that loads battle content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── battle.toml
/// ├── abilities.ron
/// └── roster.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The data directory bundled with this crate.
    pub fn bundled() -> Self {
        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("data"))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load battle configuration from `battle.toml`.
    pub fn load_config(&self) -> LoadResult<BattleConfig> {
        ConfigLoader::load(&self.data_dir.join("battle.toml"))
    }

    /// Load the ability table from `abilities.ron`.
    pub fn load_abilities(&self) -> LoadResult<AbilityTable> {
        AbilityTableLoader::load(&self.data_dir.join("abilities.ron"))
    }

    /// Load the roster from `roster.ron`.
    pub fn load_roster(&self) -> LoadResult<RosterSpec> {
        RosterLoader::load(&self.data_dir.join("roster.ron"))
    }
}
