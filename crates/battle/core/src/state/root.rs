//! Convergence root over the replicated part of a battle.
//!
//! Host and guest frame their rosters differently, so the root is computed over
//! a canonical view: every combatant keyed by its [`AbsoluteAddress`], sorted.
//! Turn counter and outcome clock are excluded; only the replicated combat
//! state (HP, shield, life, status records, resistance charges) is hashed.

use super::{AbsoluteAddress, BattleState, CombatantId, ResistanceCharges, StatusEffectRecord};

#[derive(serde::Serialize)]
struct CanonicalEntry<'a> {
    address: AbsoluteAddress,
    id: CombatantId,
    current_hp: u32,
    max_hp: u32,
    current_shield: u32,
    alive: bool,
    resistance: ResistanceCharges,
    status: Vec<&'a StatusEffectRecord>,
}

/// SHA-256 over the canonical, framing-independent battle snapshot.
///
/// Two peers that applied the same outcomes produce the same root.
pub fn convergence_root(state: &BattleState) -> [u8; 32] {
    use sha2::{Digest, Sha256};

    let mut entries: Vec<CanonicalEntry<'_>> = state
        .all()
        .map(|(descriptor, combatant)| {
            let mut status: Vec<&StatusEffectRecord> = combatant.status.iter().collect();
            status.sort_by_key(|record| record.kind);
            CanonicalEntry {
                address: descriptor.address(),
                id: combatant.id,
                current_hp: combatant.current_hp,
                max_hp: combatant.max_hp,
                current_shield: combatant.current_shield,
                alive: combatant.alive,
                resistance: combatant.resistance,
                status,
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.address);

    let mut hasher = Sha256::new();
    hasher.update(state.battle_id.to_le_bytes());
    for entry in &entries {
        if let Ok(bytes) = bincode::serialize(entry) {
            hasher.update(&bytes);
        }
    }
    hasher.finalize().into()
}

impl BattleState {
    /// See [`convergence_root`].
    pub fn convergence_root(&self) -> [u8; 32] {
        convergence_root(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{AbsoluteSide, Combatant, Slot, StatusKind, Turn};

    fn build(me: AbsoluteSide) -> BattleState {
        let mut state = BattleState::new(42, me);
        state
            .add_hero_at(
                AbsoluteSide::Host,
                Slot::Left,
                Combatant::hero(CombatantId(1), "Knight", 100),
            )
            .unwrap();
        state
            .add_hero_at(
                AbsoluteSide::Guest,
                Slot::Right,
                Combatant::hero(CombatantId(2), "Witch", 80),
            )
            .unwrap();
        state
    }

    #[test]
    fn root_ignores_local_framing_and_turn() {
        let host = build(AbsoluteSide::Host);
        let mut guest = build(AbsoluteSide::Guest);
        guest.advance_turn();
        guest.next_timestamp();

        assert_eq!(
            hex::encode(host.convergence_root()),
            hex::encode(guest.convergence_root())
        );
    }

    #[test]
    fn root_changes_with_combat_state() {
        let host = build(AbsoluteSide::Host);
        let mut changed = host.clone();
        let witch = changed.locate(CombatantId(2)).unwrap();
        changed
            .get_mut(&witch)
            .unwrap()
            .status
            .apply(StatusKind::Burn, 1, Turn(1));

        assert_ne!(host.convergence_root(), changed.convergence_root());
    }
}
