//! Resistance ledger.
//!
//! Charges live on each [`Combatant`](crate::state::Combatant); the ledger holds
//! the policy deciding whether a given cast qualifies. A qualifying check
//! consumes exactly one charge, and the next check sees the decremented count.

use crate::action::AbilityId;
use crate::state::{BattleState, StateError, StatusKind, TargetDescriptor};

/// Who a resistance charge reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistancePolicy {
    /// Whether casts from the defender's own side can be resisted.
    pub friendly_fire_qualifies: bool,
    /// A caster holding this status ignores resistance.
    pub bypass_status: Option<StatusKind>,
}

impl Default for ResistancePolicy {
    fn default() -> Self {
        Self {
            friendly_fire_qualifies: false,
            bypass_status: Some(StatusKind::Piercing),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResistanceLedger {
    policy: ResistancePolicy,
}

impl ResistanceLedger {
    pub fn new(policy: ResistancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ResistancePolicy {
        &self.policy
    }

    pub fn has_charge(&self, state: &BattleState, who: &TargetDescriptor) -> bool {
        state
            .combatant(who)
            .is_some_and(|combatant| combatant.resistance.has_charge())
    }

    /// Whether a cast from `caster` against `who` can be negated at all.
    pub fn qualifies(
        &self,
        state: &BattleState,
        who: &TargetDescriptor,
        caster: &TargetDescriptor,
    ) -> bool {
        if who.absolute_side == caster.absolute_side && !self.policy.friendly_fire_qualifies {
            return false;
        }
        if let Some(bypass) = self.policy.bypass_status
            && state
                .combatant(caster)
                .is_some_and(|combatant| combatant.status.has(bypass))
        {
            return false;
        }
        true
    }

    /// Spends one of `who`'s charges if the cast qualifies and a charge is left.
    ///
    /// Returns whether resistance fired.
    pub fn consume_if_present(
        &self,
        state: &mut BattleState,
        who: &TargetDescriptor,
        ability: AbilityId,
        caster: &TargetDescriptor,
    ) -> bool {
        if !self.qualifies(state, who, caster) {
            return false;
        }
        let Some(combatant) = state.combatant_mut(who) else {
            return false;
        };
        let fired = combatant.resistance.consume();
        if fired {
            tracing::debug!(
                defender = %who,
                ability = ability.event_type(),
                remaining = combatant.resistance.count(),
                "resistance charge consumed"
            );
        }
        fired
    }

    pub fn grant(
        &self,
        state: &mut BattleState,
        who: &TargetDescriptor,
        charges: u32,
    ) -> Result<(), StateError> {
        state.get_mut(who)?.resistance.grant(charges);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AbsoluteSide, Combatant, CombatantId, LocalSide, Slot, Turn};

    fn setup() -> (BattleState, TargetDescriptor, TargetDescriptor) {
        let mut state = BattleState::new(1, AbsoluteSide::Host);
        let caster = state
            .add_hero(
                LocalSide::Player,
                Slot::Left,
                Combatant::hero(CombatantId(1), "Mage", 50),
            )
            .unwrap();
        let defender = state
            .add_hero(
                LocalSide::Opponent,
                Slot::Left,
                Combatant::hero(CombatantId(2), "Paladin", 80).with_resistance(1),
            )
            .unwrap();
        (state, caster, defender)
    }

    #[test]
    fn one_charge_fires_once() {
        let (mut state, caster, defender) = setup();
        let ledger = ResistanceLedger::default();

        assert!(ledger.has_charge(&state, &defender));
        assert!(ledger.consume_if_present(&mut state, &defender, AbilityId::Firebolt, &caster));
        assert!(!ledger.consume_if_present(&mut state, &defender, AbilityId::Firebolt, &caster));
        assert!(!ledger.has_charge(&state, &defender));

        ledger.grant(&mut state, &defender, 1).unwrap();
        assert!(ledger.consume_if_present(&mut state, &defender, AbilityId::Hex, &caster));
    }

    #[test]
    fn friendly_casts_do_not_spend_charges() {
        let (mut state, caster, _) = setup();
        let ledger = ResistanceLedger::default();
        ledger.grant(&mut state, &caster, 1).unwrap();

        assert!(!ledger.consume_if_present(&mut state, &caster, AbilityId::Firebolt, &caster));
        assert!(ledger.has_charge(&state, &caster));
    }

    #[test]
    fn piercing_casters_bypass_resistance() {
        let (mut state, caster, defender) = setup();
        state
            .get_mut(&caster)
            .unwrap()
            .status
            .apply(StatusKind::Piercing, 1, Turn(1));
        let ledger = ResistanceLedger::default();

        assert!(!ledger.consume_if_present(&mut state, &defender, AbilityId::ChaosBolt, &caster));
        assert!(ledger.has_charge(&state, &defender));

        let strict = ResistanceLedger::new(ResistancePolicy {
            friendly_fire_qualifies: false,
            bypass_status: None,
        });
        assert!(strict.consume_if_present(&mut state, &defender, AbilityId::ChaosBolt, &caster));
    }
}
