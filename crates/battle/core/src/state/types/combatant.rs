//! Combatants: heroes and the creatures they own.

use std::collections::BTreeMap;

use crate::action::AbilityId;
use crate::env::StatusTeardown;
use crate::state::{AbsoluteSide, CombatantId, CombatantKind, LocalSide, Slot, StatusEffectStore};

/// Consumable resistance charges held by one combatant.
///
/// Each charge negates one qualifying hostile spell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistanceCharges {
    charges: u32,
}

impl ResistanceCharges {
    pub const fn new(charges: u32) -> Self {
        Self { charges }
    }

    pub const fn count(&self) -> u32 {
        self.charges
    }

    pub const fn has_charge(&self) -> bool {
        self.charges > 0
    }

    /// Spends one charge. Returns false when none was left.
    pub fn consume(&mut self) -> bool {
        if self.charges == 0 {
            return false;
        }
        self.charges -= 1;
        true
    }

    pub fn grant(&mut self, charges: u32) {
        self.charges = self.charges.saturating_add(charges);
    }

    pub fn clear(&mut self) {
        self.charges = 0;
    }
}

/// Result of one damage application.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageReport {
    pub new_hp: u32,
    /// True only on the application that moved the combatant from alive to dead.
    pub died: bool,
}

/// A hero or creature taking part in a battle.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub kind: CombatantKind,
    /// Local framing; rewritten when the combatant is placed on a roster.
    pub side: LocalSide,
    pub absolute_side: AbsoluteSide,
    pub position: Slot,
    pub current_hp: u32,
    pub max_hp: u32,
    pub current_shield: u32,
    pub alive: bool,
    pub status: StatusEffectStore,
    pub resistance: ResistanceCharges,
    pub ability_levels: BTreeMap<AbilityId, u32>,
    /// Scales the reactive damage of retaliation effects this combatant holds.
    pub retaliation_multiplier: u32,
}

impl Combatant {
    pub fn new(id: CombatantId, name: impl Into<String>, kind: CombatantKind, max_hp: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            side: LocalSide::Player,
            absolute_side: AbsoluteSide::Host,
            position: Slot::Left,
            current_hp: max_hp,
            max_hp,
            current_shield: 0,
            alive: max_hp > 0,
            status: StatusEffectStore::empty(),
            resistance: ResistanceCharges::default(),
            ability_levels: BTreeMap::new(),
            retaliation_multiplier: 1,
        }
    }

    pub fn hero(id: CombatantId, name: impl Into<String>, max_hp: u32) -> Self {
        Self::new(id, name, CombatantKind::Hero, max_hp)
    }

    pub fn creature(id: CombatantId, name: impl Into<String>, max_hp: u32) -> Self {
        Self::new(id, name, CombatantKind::Creature, max_hp)
    }

    pub fn with_ability(mut self, ability: AbilityId, level: u32) -> Self {
        self.ability_levels.insert(ability, level);
        self
    }

    pub fn with_hp(mut self, current_hp: u32) -> Self {
        self.current_hp = current_hp.min(self.max_hp);
        self.alive = self.current_hp > 0;
        self
    }

    pub fn with_shield(mut self, shield: u32) -> Self {
        self.current_shield = shield;
        self
    }

    pub fn with_resistance(mut self, charges: u32) -> Self {
        self.resistance = ResistanceCharges::new(charges);
        self
    }

    pub fn with_retaliation_multiplier(mut self, multiplier: u32) -> Self {
        self.retaliation_multiplier = multiplier;
        self
    }

    /// Level of `ability`, zero when not learned.
    pub fn level_of(&self, ability: AbilityId) -> u32 {
        self.ability_levels.get(&ability).copied().unwrap_or(0)
    }

    pub fn missing_hp(&self) -> u32 {
        self.max_hp.saturating_sub(self.current_hp)
    }

    /// Current HP as a fraction of max HP, in `[0, 1]`.
    pub fn hp_fraction(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }

    /// Splits an incoming hit into `(shield_absorbed, hp_lost)` without mutating.
    pub fn plan_damage(&self, amount: u32) -> (u32, u32) {
        let absorbed = amount.min(self.current_shield);
        let hp_lost = (amount - absorbed).min(self.current_hp);
        (absorbed, hp_lost)
    }

    /// Applies realized damage. Death clears the status store exactly once.
    pub fn take_damage(
        &mut self,
        shield_absorbed: u32,
        hp_lost: u32,
        teardown: &mut dyn StatusTeardown,
    ) -> DamageReport {
        self.current_shield = self.current_shield.saturating_sub(shield_absorbed);
        self.current_hp = self.current_hp.saturating_sub(hp_lost);

        let died = self.alive && self.current_hp == 0;
        if died {
            self.alive = false;
            self.status.clear_on_death(self.id, teardown);
        }

        DamageReport {
            new_hp: self.current_hp,
            died,
        }
    }

    /// Heals up to `amount`, returning the HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if !self.alive {
            return 0;
        }
        let restored = amount.min(self.missing_hp());
        self.current_hp += restored;
        restored
    }

    pub fn grant_shield(&mut self, amount: u32) {
        self.current_shield = self.current_shield.saturating_add(amount);
    }
}
