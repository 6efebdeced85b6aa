//! Ability profile loader.
//!
//! Loads ability profiles from RON data files.

use std::path::Path;

use battle_core::{AbilityProfile, AbilityTable};

use crate::loaders::{LoadResult, read_file};

/// Loader for the ability table.
pub struct AbilityTableLoader;

impl AbilityTableLoader {
    /// Loads the ability table shipped with this crate.
    pub fn load_embedded() -> LoadResult<AbilityTable> {
        let content = include_str!("../../data/abilities.ron");
        Self::parse(content, "abilities.ron")
    }

    /// Loads an ability table from a RON file holding a list of profiles.
    ///
    /// Abilities without a profile are reported as a warning; casting one
    /// later fails with `AbilityNotFound`.
    pub fn load(path: &Path) -> LoadResult<AbilityTable> {
        let content = read_file(path)?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Like [`load`](Self::load), but every ability must have a profile.
    pub fn load_complete(path: &Path) -> LoadResult<AbilityTable> {
        let table = Self::load(path)?;
        let missing = table.missing();
        if !missing.is_empty() {
            anyhow::bail!(
                "{} is missing profiles for: {}",
                path.display(),
                missing
                    .iter()
                    .map(|id| id.event_type())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
        Ok(table)
    }

    fn parse(content: &str, source: &str) -> LoadResult<AbilityTable> {
        let profiles: Vec<AbilityProfile> = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", source, e))?;

        let mut table = AbilityTable::new();
        for profile in profiles {
            let id = profile.id;
            if table.insert(profile).is_some() {
                anyhow::bail!("{} defines {} more than once", source, id.event_type());
            }
        }

        for id in table.missing() {
            tracing::warn!(ability = id.event_type(), source, "ability has no profile");
        }
        Ok(table)
    }
}
