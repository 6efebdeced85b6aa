//! Host-side action resolution and guest-side replay.
//!
//! The [`ActionResolutionPipeline`] is the authoritative reducer for one cast.
//! It walks `Idle → TargetsResolved → ResistanceChecked → MagnitudeComputed →
//! StacksApplied → OutcomeEmitted → Idle` and records every state change as a
//! [`Mutation`]. Mutations are applied through [`apply_mutation`], the same
//! function the guest uses in [`replay_outcome`].

mod errors;
mod replay;
mod resistance;

pub use errors::{PipelineError, PipelineStage, ReplayError};
pub use replay::{ReplayStatus, apply_mutation, replay_outcome};
pub use resistance::{ResistanceLedger, ResistancePolicy};

use crate::action::targeting;
use crate::action::{
    AbilityId, AbilityProfile, ActionOutcome, EffectSpec, Mutation, StatusRider, TargetReport,
};
use crate::config::BattleConfig;
use crate::env::{AbilityOracle, NoTeardown, RandomSource, StatusTeardown};
use crate::state::{
    BattleState, CombatantId, StackOp, StatusFlags, TargetDescriptor, Trigger, Turn,
};

/// A request to cast `ability` as `caster`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CastRequest {
    pub caster: CombatantId,
    pub ability: AbilityId,
}

impl CastRequest {
    pub fn new(caster: CombatantId, ability: AbilityId) -> Self {
        Self { caster, ability }
    }
}

/// A cast that found nothing to act on. Logged locally, never replicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoTargetReport {
    pub ability: AbilityId,
    pub caster: TargetDescriptor,
    pub turn: Turn,
}

/// Terminal result of one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Emitted(ActionOutcome),
    NoTarget(NoTargetReport),
}

impl Resolution {
    pub fn outcome(&self) -> Option<&ActionOutcome> {
        match self {
            Self::Emitted(outcome) => Some(outcome),
            Self::NoTarget(_) => None,
        }
    }

    pub fn into_outcome(self) -> Option<ActionOutcome> {
        match self {
            Self::Emitted(outcome) => Some(outcome),
            Self::NoTarget(_) => None,
        }
    }
}

/// Resolves casts against a battle state. Host only.
///
/// Every collaborator is injected; the pipeline owns no battle state.
pub struct ActionResolutionPipeline<'a> {
    state: &'a mut BattleState,
    rng: &'a mut dyn RandomSource,
    abilities: &'a dyn AbilityOracle,
    ledger: &'a ResistanceLedger,
    config: &'a BattleConfig,
    teardown: Option<&'a mut dyn StatusTeardown>,
    stage: PipelineStage,
    trace: Vec<PipelineStage>,
}

impl<'a> ActionResolutionPipeline<'a> {
    pub fn new(
        state: &'a mut BattleState,
        rng: &'a mut dyn RandomSource,
        abilities: &'a dyn AbilityOracle,
        ledger: &'a ResistanceLedger,
        config: &'a BattleConfig,
    ) -> Self {
        Self {
            state,
            rng,
            abilities,
            ledger,
            config,
            teardown: None,
            stage: PipelineStage::Idle,
            trace: Vec::new(),
        }
    }

    pub fn with_teardown(mut self, teardown: &'a mut dyn StatusTeardown) -> Self {
        self.teardown = Some(teardown);
        self
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Stages visited by the latest `resolve` call, in order.
    pub fn trace(&self) -> &[PipelineStage] {
        &self.trace
    }

    pub fn state(&self) -> &BattleState {
        self.state
    }

    /// Runs one cast to completion.
    ///
    /// Once targets are resolved the cast always reaches `OutcomeEmitted`
    /// unless a mutation fails, which indicates corrupted state.
    pub fn resolve(&mut self, request: CastRequest) -> Result<Resolution, PipelineError> {
        self.trace.clear();
        self.enter(PipelineStage::Idle);

        let result = self.run(request);
        self.enter(PipelineStage::Idle);
        result
    }

    fn run(&mut self, request: CastRequest) -> Result<Resolution, PipelineError> {
        let CastRequest { caster: caster_id, ability } = request;
        let abilities = self.abilities;
        let config = self.config;

        let caster = self
            .state
            .locate(caster_id)
            .ok_or(PipelineError::CasterNotFound(caster_id))?;
        let caster_combatant = self.state.get(&caster)?;
        if !caster_combatant.alive {
            return Err(PipelineError::CasterDead(caster_id));
        }
        let level = caster_combatant.level_of(ability);
        if level == 0 {
            return Err(PipelineError::AbilityNotLearned {
                caster: caster_id,
                ability,
            });
        }
        let profile = abilities
            .profile(ability)
            .ok_or(PipelineError::AbilityNotFound(ability))?;
        let turn = self.state.turn;

        // Targets.
        let targets =
            targeting::resolve(&profile.targeting, self.state, &caster, config, &mut *self.rng);
        if targets.is_empty() {
            tracing::debug!(ability = ability.event_type(), caster = %caster, "no target");
            return Ok(Resolution::NoTarget(NoTargetReport {
                ability,
                caster,
                turn,
            }));
        }
        self.enter(PipelineStage::TargetsResolved);

        let mut reports: Vec<TargetReport> = targets.iter().copied().map(TargetReport::new).collect();
        let mut mutations = Vec::new();

        // Resistance, per target independently.
        if profile.resistible {
            for report in &mut reports {
                if self
                    .ledger
                    .consume_if_present(self.state, &report.target, ability, &caster)
                {
                    report.resisted = true;
                    mutations.push(Mutation::ConsumeResistance {
                        target: report.target,
                    });
                }
            }
        }
        self.enter(PipelineStage::ResistanceChecked);

        // Magnitudes, from the pre-effect snapshot.
        let caster_snapshot = self.state.get(&caster)?.clone();
        let magnitudes = reports
            .iter()
            .map(|report| -> Result<u32, PipelineError> {
                let target = self.state.get(&report.target)?;
                Ok(profile.magnitude.evaluate(level, &caster_snapshot, target))
            })
            .collect::<Result<Vec<u32>, PipelineError>>()?;
        self.enter(PipelineStage::MagnitudeComputed);

        for (report, magnitude) in reports.iter_mut().zip(magnitudes) {
            if report.resisted {
                continue;
            }
            self.apply_effect(profile, &caster, report, magnitude, turn, &mut mutations)?;
        }

        if let Some(rider) = profile.self_stack
            && reports.iter().any(TargetReport::landed)
            && self.state.get(&caster)?.alive
        {
            self.apply_stacks(&caster, rider, turn, &mut mutations)?;
        }
        self.enter(PipelineStage::StacksApplied);

        let outcome = ActionOutcome {
            ability,
            caster,
            targets,
            reports,
            mutations,
            turn,
            timestamp: self.state.next_timestamp(),
        };
        self.enter(PipelineStage::OutcomeEmitted);
        tracing::debug!(
            ability = ability.event_type(),
            timestamp = outcome.timestamp,
            mutations = outcome.mutations.len(),
            "outcome emitted"
        );

        Ok(Resolution::Emitted(outcome))
    }

    fn enter(&mut self, stage: PipelineStage) {
        tracing::trace!(from = %self.stage, to = %stage, "pipeline stage");
        self.stage = stage;
        self.trace.push(stage);
    }

    /// Applies a mutation through the shared write path and records it.
    fn commit(
        &mut self,
        mutation: Mutation,
        mutations: &mut Vec<Mutation>,
    ) -> Result<(), PipelineError> {
        let mut fallback = NoTeardown;
        let teardown: &mut dyn StatusTeardown = match self.teardown.as_deref_mut() {
            Some(teardown) => teardown,
            None => &mut fallback,
        };
        apply_mutation(self.state, &mutation, teardown).map_err(|source| {
            PipelineError::Mutation {
                stage: self.stage,
                source,
            }
        })?;
        mutations.push(mutation);
        Ok(())
    }

    fn apply_stacks(
        &mut self,
        target: &TargetDescriptor,
        rider: StatusRider,
        turn: Turn,
        mutations: &mut Vec<Mutation>,
    ) -> Result<u32, PipelineError> {
        if rider.stacks == 0 {
            return Ok(0);
        }
        self.commit(
            Mutation::ApplyStacks {
                target: *target,
                kind: rider.kind,
                op: StackOp::for_kind(rider.kind, rider.stacks),
                turn,
            },
            mutations,
        )?;
        Ok(rider.stacks)
    }

    fn apply_effect(
        &mut self,
        profile: &AbilityProfile,
        caster: &TargetDescriptor,
        report: &mut TargetReport,
        magnitude: u32,
        turn: Turn,
        mutations: &mut Vec<Mutation>,
    ) -> Result<(), PipelineError> {
        let target = report.target;
        let attack = profile.effect.is_harmful() && target.absolute_side != caster.absolute_side;

        if attack && self.try_redirect(caster, &target, turn, mutations)? {
            report.redirected = true;
            return Ok(());
        }
        // Snapshot before the hit: death clears the store.
        let retaliation = if attack {
            self.retaliation_against(&target, turn)?
        } else {
            0
        };

        match profile.effect {
            EffectSpec::Damage => {
                let defender = self.state.get(&target)?;
                let was_alive = defender.alive;
                let (shield_absorbed, hp_lost) = defender.plan_damage(magnitude);
                self.commit(
                    Mutation::Damage {
                        target,
                        shield_absorbed,
                        hp_lost,
                    },
                    mutations,
                )?;
                report.damage = shield_absorbed + hp_lost;
                report.died = was_alive && !self.state.get(&target)?.alive;
            }
            EffectSpec::Heal => {
                let patient = self.state.get(&target)?;
                if patient.status.any_with(StatusFlags::BLOCKS_HEALING) {
                    report.heal_blocked = true;
                    return Ok(());
                }
                let amount = magnitude.min(patient.missing_hp());
                if amount > 0 {
                    self.commit(Mutation::Heal { target, amount }, mutations)?;
                }
                report.healed = amount;
            }
            EffectSpec::Shield => {
                if magnitude > 0 {
                    self.commit(
                        Mutation::GrantShield {
                            target,
                            amount: magnitude,
                        },
                        mutations,
                    )?;
                }
                report.shield = magnitude;
            }
            EffectSpec::ApplyStatus(kind) => {
                report.stacks += self.apply_stacks(
                    &target,
                    StatusRider {
                        kind,
                        stacks: magnitude,
                    },
                    turn,
                    mutations,
                )?;
            }
            EffectSpec::GrantResistance => {
                if magnitude > 0 {
                    self.commit(
                        Mutation::GrantResistance {
                            target,
                            charges: magnitude,
                        },
                        mutations,
                    )?;
                }
            }
        }

        if retaliation > 0 && self.state.get(caster)?.alive {
            let (absorbed, lost) = self.state.get(caster)?.plan_damage(retaliation);
            self.commit(
                Mutation::Damage {
                    target: *caster,
                    shield_absorbed: absorbed,
                    hp_lost: lost,
                },
                mutations,
            )?;
            report.retaliation = absorbed + lost;
        }

        if let Some(rider) = profile.rider
            && self.state.get(&target)?.alive
        {
            report.stacks += self.apply_stacks(&target, rider, turn, mutations)?;
        }
        Ok(())
    }

    /// Negates an attack if the defender holds a redirect effect.
    ///
    /// The defender's record is consumed and the attacker receives the imposed
    /// status with the defender's stacks plus its identity bonus.
    fn try_redirect(
        &mut self,
        caster: &TargetDescriptor,
        target: &TargetDescriptor,
        turn: Turn,
        mutations: &mut Vec<Mutation>,
    ) -> Result<bool, PipelineError> {
        let defender = self.state.get(target)?;
        let redirect = defender.status.iter().find_map(|record| match record.kind.trigger() {
            Some(Trigger::Redirect { imposes }) if record.stacks > 0 => {
                Some((record.kind, imposes, record.stacks))
            }
            _ => None,
        });
        let Some((kind, imposes, stacks)) = redirect else {
            return Ok(false);
        };
        let imposed = stacks.saturating_add(self.config.redirect_bonus_for(&defender.name));

        self.commit(
            Mutation::RemoveStatus {
                target: *target,
                kind,
            },
            mutations,
        )?;
        self.apply_stacks(
            caster,
            StatusRider {
                kind: imposes,
                stacks: imposed,
            },
            turn,
            mutations,
        )?;
        tracing::debug!(defender = %target, imposed, "attack redirected");
        Ok(true)
    }

    /// Reactive damage the defender's retaliation effects would deal this turn.
    fn retaliation_against(
        &self,
        target: &TargetDescriptor,
        turn: Turn,
    ) -> Result<u32, PipelineError> {
        let defender = self.state.get(target)?;
        let total = defender
            .status
            .iter()
            .filter_map(|record| match record.kind.trigger() {
                Some(Trigger::Retaliation { per_stack })
                    if defender.status.retaliation_active(record.kind, turn) =>
                {
                    Some(
                        record
                            .stacks
                            .saturating_mul(per_stack)
                            .saturating_mul(defender.retaliation_multiplier),
                    )
                }
                _ => None,
            })
            .fold(0u32, u32::saturating_add);
        Ok(total)
    }
}
