//! Application of realized mutations.
//!
//! [`apply_mutation`] is the single write path for outcome-driven state
//! changes: the host pipeline calls it as it resolves, and the guest calls it
//! through [`replay_outcome`]. Both peers therefore run identical code over
//! identical values.

use crate::action::{ActionOutcome, Mutation};
use crate::env::StatusTeardown;
use crate::state::BattleState;

use super::ReplayError;

/// Result of replaying one outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplayStatus {
    Applied,
    /// The outcome's timestamp was already observed; nothing changed.
    AlreadyApplied,
}

/// Applies one realized mutation to `state`.
///
/// Descriptors must already be framed for `state`'s peer.
pub fn apply_mutation(
    state: &mut BattleState,
    mutation: &Mutation,
    teardown: &mut dyn StatusTeardown,
) -> Result<(), ReplayError> {
    match *mutation {
        Mutation::Damage {
            target,
            shield_absorbed,
            hp_lost,
        } => {
            state.apply_damage(&target, shield_absorbed, hp_lost, teardown)?;
        }
        Mutation::Heal { target, amount } => {
            state.get_mut(&target)?.heal(amount);
        }
        Mutation::GrantShield { target, amount } => {
            state.get_mut(&target)?.grant_shield(amount);
        }
        Mutation::ApplyStacks {
            target,
            kind,
            op,
            turn,
        } => {
            state.get_mut(&target)?.status.apply_op(kind, op, turn)?;
        }
        Mutation::RemoveStatus { target, kind } => {
            state.get_mut(&target)?.status.remove(kind);
        }
        Mutation::ConsumeResistance { target } => {
            state.get_mut(&target)?.resistance.consume();
        }
        Mutation::GrantResistance { target, charges } => {
            state.get_mut(&target)?.resistance.grant(charges);
        }
    }
    Ok(())
}

/// Replays a host outcome on this peer's state.
///
/// Every descriptor is re-framed for `state.me()` and validated before any
/// mutation is applied, so a malformed outcome leaves the state untouched.
/// An outcome whose timestamp is not newer than the last observed one is a
/// re-delivery and is ignored.
pub fn replay_outcome(
    state: &mut BattleState,
    outcome: &ActionOutcome,
    teardown: &mut dyn StatusTeardown,
) -> Result<ReplayStatus, ReplayError> {
    if outcome.timestamp <= state.clock() {
        return Ok(ReplayStatus::AlreadyApplied);
    }

    let outcome = outcome.clone().localized(state.me());
    for descriptor in outcome.descriptors() {
        state.validate_descriptor(descriptor)?;
    }

    for mutation in &outcome.mutations {
        apply_mutation(state, mutation, teardown)?;
    }
    state.observe_timestamp(outcome.timestamp);
    Ok(ReplayStatus::Applied)
}
