//! Roster loader.
//!
//! A roster lists every hero by absolute side, so both peers build the same
//! battle from the same file regardless of which side they play.

use std::path::Path;

use battle_core::{
    AbilityId, AbsoluteSide, BattleState, Combatant, CombatantId, Slot, StateError, StatusKind,
};

use crate::loaders::{LoadResult, read_file};

/// A creature summoned alongside its hero.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CreatureSpec {
    pub id: u32,
    pub name: String,
    pub max_hp: u32,
    #[serde(default)]
    pub resistance: u32,
    #[serde(default)]
    pub abilities: Vec<(AbilityId, u32)>,
}

impl CreatureSpec {
    fn build(&self) -> Combatant {
        self.abilities.iter().fold(
            Combatant::creature(CombatantId(self.id), self.name.clone(), self.max_hp)
                .with_resistance(self.resistance),
            |combatant, &(ability, level)| combatant.with_ability(ability, level),
        )
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HeroSpec {
    pub id: u32,
    pub name: String,
    pub side: AbsoluteSide,
    pub slot: Slot,
    pub max_hp: u32,
    #[serde(default)]
    pub shield: u32,
    #[serde(default)]
    pub resistance: u32,
    #[serde(default)]
    pub retaliation_multiplier: Option<u32>,
    #[serde(default)]
    pub abilities: Vec<(AbilityId, u32)>,
    /// Permanent stacks carried in from a previous battle.
    #[serde(default)]
    pub carried: Vec<(StatusKind, u32)>,
    #[serde(default)]
    pub creatures: Vec<CreatureSpec>,
}

impl HeroSpec {
    fn build(&self) -> Combatant {
        let mut hero = Combatant::hero(CombatantId(self.id), self.name.clone(), self.max_hp)
            .with_shield(self.shield)
            .with_resistance(self.resistance);
        if let Some(multiplier) = self.retaliation_multiplier {
            hero = hero.with_retaliation_multiplier(multiplier);
        }
        for &(ability, level) in &self.abilities {
            hero = hero.with_ability(ability, level);
        }
        hero
    }
}

/// Both sides of a battle.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RosterSpec {
    pub heroes: Vec<HeroSpec>,
}

impl RosterSpec {
    /// Builds the battle as seen by `me`.
    pub fn build(&self, battle_id: u64, me: AbsoluteSide) -> Result<BattleState, StateError> {
        let mut state = BattleState::new(battle_id, me);
        let mut carried = Vec::new();

        for spec in &self.heroes {
            let hero = state.add_hero_at(spec.side, spec.slot, spec.build())?;
            for creature in &spec.creatures {
                state.add_creature(&hero, creature.build())?;
            }
            carried.extend(spec.carried.iter().map(|&(kind, stacks)| {
                battle_core::PersistedStack {
                    combatant: CombatantId(spec.id),
                    kind,
                    stacks,
                }
            }));
        }

        state.restore_persisted(&carried)?;
        Ok(state)
    }
}

/// Loader for rosters from RON files.
pub struct RosterLoader;

impl RosterLoader {
    /// Loads the demo roster shipped with this crate.
    pub fn load_embedded() -> LoadResult<RosterSpec> {
        Self::parse(include_str!("../../data/roster.ron"))
    }

    pub fn load(path: &Path) -> LoadResult<RosterSpec> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> LoadResult<RosterSpec> {
        ron::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse roster RON: {}", e))
    }
}
