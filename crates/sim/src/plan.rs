//! Scripted casting order.

use anyhow::Result;
use battle_core::{AbilityId, BattleError, CastRequest, CombatantId, Resolution};
use battle_runtime::{HostError, HostSession, Transport};

#[derive(Clone, Copy, Debug, Default)]
pub struct Tally {
    pub casts: usize,
    pub emitted: usize,
    pub no_target: usize,
    pub rejected: usize,
}

/// Plays `rounds` rounds. Each round advances the turn, then every living
/// combatant casts each ability it knows, in roster order.
///
/// Recoverable cast failures (a caster killed earlier in the round) are
/// counted and skipped; anything else aborts the run.
pub async fn play<T: Transport>(host: &mut HostSession<T>, rounds: usize) -> Result<Tally> {
    let mut tally = Tally::default();

    for _ in 0..rounds {
        let turn = host.advance_turn();
        tracing::info!(%turn, "round started");

        let casts: Vec<(CombatantId, AbilityId)> = host
            .state()
            .all()
            .filter(|(_, combatant)| combatant.alive)
            .flat_map(|(_, combatant)| {
                combatant
                    .ability_levels
                    .keys()
                    .map(move |&ability| (combatant.id, ability))
            })
            .collect();

        for (caster, ability) in casts {
            tally.casts += 1;
            match host.cast(CastRequest::new(caster, ability)).await {
                Ok(Resolution::Emitted(_)) => tally.emitted += 1,
                Ok(Resolution::NoTarget(_)) => tally.no_target += 1,
                Err(err @ HostError::Pipeline(_)) if err.severity().is_recoverable() => {
                    tally.rejected += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
    Ok(tally)
}
