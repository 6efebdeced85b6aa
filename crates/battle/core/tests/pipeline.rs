mod common;

use battle_core::{
    AbilityId, AbsoluteSide, ActionResolutionPipeline, BattleConfig, BattleError, CastRequest,
    CombatantId, ErrorSeverity, Mutation, PcgRandom, PipelineError, PipelineStage, RandomSource,
    Resolution, ResistanceLedger, ScriptedRandom, StatusKind, StatusTeardown, Turn,
};
use common::*;

fn cast(
    state: &mut battle_core::BattleState,
    rng: &mut dyn RandomSource,
    config: &BattleConfig,
    caster: CombatantId,
    ability: AbilityId,
) -> Result<Resolution, PipelineError> {
    let table = abilities();
    let ledger = ResistanceLedger::default();
    let mut pipeline = ActionResolutionPipeline::new(state, rng, &table, &ledger, config);
    pipeline.resolve(CastRequest::new(caster, ability))
}

fn emitted(resolution: Resolution) -> battle_core::ActionOutcome {
    resolution
        .into_outcome()
        .expect("cast should emit an outcome")
}

#[test]
fn stages_run_in_order_and_return_to_idle() {
    let mut state = battle(AbsoluteSide::Host);
    let table = abilities();
    let ledger = ResistanceLedger::default();
    let config = BattleConfig::default();
    let mut rng = PcgRandom::new(1);

    let mut pipeline =
        ActionResolutionPipeline::new(&mut state, &mut rng, &table, &ledger, &config);
    pipeline
        .resolve(CastRequest::new(SORCERER, AbilityId::Blizzard))
        .expect("blizzard should resolve");

    assert_eq!(pipeline.stage(), PipelineStage::Idle);
    assert_eq!(
        pipeline.trace(),
        &[
            PipelineStage::Idle,
            PipelineStage::TargetsResolved,
            PipelineStage::ResistanceChecked,
            PipelineStage::MagnitudeComputed,
            PipelineStage::StacksApplied,
            PipelineStage::OutcomeEmitted,
            PipelineStage::Idle,
        ]
    );
}

#[test]
fn resistance_is_checked_per_target() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default();
    let mut rng = PcgRandom::new(1);

    let outcome = emitted(
        cast(&mut state, &mut rng, &config, SORCERER, AbilityId::Blizzard)
            .expect("blizzard should resolve"),
    );

    assert_eq!(outcome.targets.len(), 2);
    assert!(outcome.reports[0].resisted, "imp spends its charge");
    assert!(!outcome.reports[1].resisted, "ghoul has no charge");
    assert_eq!(hp(&state, IMP), 20);
    assert_eq!(hp(&state, GHOUL), 15);
    assert_eq!(stacks(&state, IMP, StatusKind::Frost), 0);
    assert_eq!(stacks(&state, GHOUL, StatusKind::Frost), 1);

    // The charge is gone; the next cast lands on both.
    let outcome = emitted(
        cast(&mut state, &mut rng, &config, SORCERER, AbilityId::Blizzard)
            .expect("blizzard should resolve"),
    );
    assert!(outcome.reports.iter().all(|r| !r.resisted));
    assert_eq!(hp(&state, IMP), 10);
    assert_eq!(hp(&state, GHOUL), 5);
    assert_eq!(stacks(&state, GHOUL, StatusKind::Frost), 2);
}

#[test]
fn priority_fallback_uses_one_roll_and_may_find_nothing() {
    let mut state = battle(AbsoluteSide::Host);
    kill(&mut state, IMP);
    kill(&mut state, GHOUL);
    let config = BattleConfig::default();

    let mut rng = ScriptedRandom::new([0.2, 0.0]);
    let outcome = emitted(
        cast(&mut state, &mut rng, &config, SORCERER, AbilityId::Firebolt)
            .expect("firebolt should resolve"),
    );
    assert_eq!(hp(&state, WARLORD), 95);
    assert_eq!(stacks(&state, WARLORD, StatusKind::Burn), 1);
    assert_eq!(outcome.timestamp, 1);

    let mut rng = ScriptedRandom::new([0.95]);
    let resolution = cast(&mut state, &mut rng, &config, SORCERER, AbilityId::Firebolt)
        .expect("residual band is not an error");
    assert!(matches!(resolution, Resolution::NoTarget(_)));
    assert_eq!(state.clock(), 1, "no-target casts issue no timestamp");
    assert_eq!(hp(&state, WARLORD), 95);
}

#[test]
fn self_harm_band_hits_an_ally_without_spending_resistance() {
    let mut state = battle(AbsoluteSide::Host);
    kill(&mut state, IMP);
    kill(&mut state, GHOUL);
    combatant_mut(&mut state, CLERIC).resistance.grant(1);
    let config = BattleConfig::default();

    let mut rng = ScriptedRandom::new([0.6, 0.0]);
    let outcome = emitted(
        cast(&mut state, &mut rng, &config, SORCERER, AbilityId::Firebolt)
            .expect("firebolt should resolve"),
    );

    assert!(!outcome.reports[0].resisted);
    assert_eq!(hp(&state, CLERIC), 75);
    assert_eq!(hp(&state, SORCERER), 100);
    assert_eq!(
        state
            .get(&state.locate(CLERIC).expect("cleric exists"))
            .expect("cleric resolves")
            .resistance
            .count(),
        1
    );
}

#[test]
fn retaliation_waits_until_the_turn_after_casting() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default();

    cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::Thornskin)
        .expect("thornskin should resolve");
    assert_eq!(stacks(&state, CLERIC, StatusKind::Thorns), 2);

    // Same turn: no retaliation yet.
    let outcome = emitted(
        cast(
            &mut state,
            &mut ScriptedRandom::new([0.99]),
            &config,
            WARLORD,
            AbilityId::ChaosBolt,
        )
        .expect("chaos bolt should resolve"),
    );
    assert_eq!(outcome.reports[0].retaliation, 0);
    assert_eq!(hp(&state, CLERIC), 70);
    assert_eq!(hp(&state, WARLORD), 120);

    state.advance_turn();
    let outcome = emitted(
        cast(
            &mut state,
            &mut ScriptedRandom::new([0.99]),
            &config,
            WARLORD,
            AbilityId::ChaosBolt,
        )
        .expect("chaos bolt should resolve"),
    );
    assert_eq!(outcome.turn, Turn(2));
    assert_eq!(outcome.reports[0].retaliation, 10);
    assert_eq!(hp(&state, CLERIC), 40);
    assert_eq!(hp(&state, WARLORD), 110);
}

#[test]
fn redirect_negates_the_attack_and_weakens_the_attacker() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default().with_redirect_bonus("Cleric", 1);

    cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::MirrorImage)
        .expect("mirror image should resolve");

    let outcome = emitted(
        cast(
            &mut state,
            &mut ScriptedRandom::new([0.99]),
            &config,
            WARLORD,
            AbilityId::ChaosBolt,
        )
        .expect("chaos bolt should resolve"),
    );

    assert!(outcome.reports[0].redirected);
    assert_eq!(hp(&state, CLERIC), 100);
    assert_eq!(stacks(&state, CLERIC, StatusKind::Mirror), 0);
    assert_eq!(stacks(&state, WARLORD, StatusKind::Weakness), 3);
    assert!(matches!(outcome.mutations[0], Mutation::RemoveStatus { .. }));
    assert!(matches!(outcome.mutations[1], Mutation::ApplyStacks { .. }));
}

#[test]
fn hostile_debuffs_count_as_attacks() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default().with_redirect_bonus("Cleric", 1);

    cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::MirrorImage)
        .expect("mirror image should resolve");
    let outcome = emitted(
        cast(
            &mut state,
            &mut ScriptedRandom::new([0.99]),
            &config,
            WARLORD,
            AbilityId::Hex,
        )
        .expect("hex should resolve"),
    );
    assert!(outcome.reports[0].redirected);
    assert_eq!(stacks(&state, CLERIC, StatusKind::HealBlock), 0);
    assert_eq!(stacks(&state, CLERIC, StatusKind::Mirror), 0);
    assert_eq!(stacks(&state, WARLORD, StatusKind::Weakness), 3);

    cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::Thornskin)
        .expect("thornskin should resolve");
    state.advance_turn();
    let outcome = emitted(
        cast(
            &mut state,
            &mut ScriptedRandom::new([0.99]),
            &config,
            WARLORD,
            AbilityId::Hex,
        )
        .expect("hex should resolve"),
    );
    assert!(!outcome.reports[0].redirected);
    assert_eq!(outcome.reports[0].retaliation, 10);
    assert_eq!(stacks(&state, CLERIC, StatusKind::HealBlock), 2);
    assert_eq!(hp(&state, WARLORD), 110);
}

#[test]
fn friendly_buffs_never_trigger_attack_reactions() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default();

    cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::Thornskin)
        .expect("thornskin should resolve");
    state.advance_turn();
    let outcome = emitted(
        cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::Thornskin)
            .expect("thornskin should resolve again"),
    );
    assert_eq!(outcome.reports[0].retaliation, 0);
    assert_eq!(hp(&state, CLERIC), 100);
    assert_eq!(stacks(&state, CLERIC, StatusKind::Thorns), 4);
}

#[test]
fn stacking_self_buff_feeds_the_damage_formula() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default();

    for _ in 0..2 {
        cast(
            &mut state,
            &mut ScriptedRandom::new([0.0]),
            &config,
            SORCERER,
            AbilityId::Frenzy,
        )
        .expect("frenzy should resolve");
    }

    assert_eq!(stacks(&state, SORCERER, StatusKind::Fury), 2);
    assert_eq!(hp(&state, WARLORD), 120 - 10 - 35);
}

#[test]
fn area_heal_skips_heal_blocked_allies() {
    let mut state = battle(AbsoluteSide::Host);
    combatant_mut(&mut state, SORCERER).current_hp = 50;
    let cleric = combatant_mut(&mut state, CLERIC);
    cleric.current_hp = 50;
    cleric.status.apply(StatusKind::HealBlock, 1, Turn(1));
    let config = BattleConfig::default();

    let outcome = emitted(
        cast(&mut state, &mut PcgRandom::new(1), &config, SORCERER, AbilityId::Renewal)
            .expect("renewal should resolve"),
    );

    assert_eq!(outcome.targets.len(), 1);
    assert_eq!(hp(&state, SORCERER), 70);
    assert_eq!(hp(&state, CLERIC), 50);
}

#[test]
fn single_heal_on_a_blocked_target_is_reported_not_applied() {
    let mut state = battle(AbsoluteSide::Host);
    let sorcerer = combatant_mut(&mut state, SORCERER);
    sorcerer.current_hp = 50;
    sorcerer.status.apply(StatusKind::HealBlock, 1, Turn(1));
    let config = BattleConfig::default();

    let outcome = emitted(
        cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::Mend)
            .expect("mend should resolve"),
    );

    assert!(outcome.reports[0].heal_blocked);
    assert!(outcome.mutations.is_empty());
    assert_eq!(hp(&state, SORCERER), 50);
}

#[derive(Default)]
struct RecordingTeardown(Vec<(CombatantId, StatusKind)>);

impl StatusTeardown for RecordingTeardown {
    fn on_teardown(&mut self, owner: CombatantId, kind: StatusKind) {
        self.0.push((owner, kind));
    }
}

#[test]
fn death_by_retaliation_tears_down_flagged_effects() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default();
    cast(&mut state, &mut PcgRandom::new(1), &config, CLERIC, AbilityId::Thornskin)
        .expect("thornskin should resolve");
    state.advance_turn();

    let warlord = combatant_mut(&mut state, WARLORD);
    warlord.current_hp = 5;
    warlord.status.apply(StatusKind::Mirror, 1, Turn(1));
    warlord.status.apply(StatusKind::Poison, 3, Turn(1));

    let table = abilities();
    let ledger = ResistanceLedger::default();
    let mut rng = ScriptedRandom::new([0.99]);
    let mut teardown = RecordingTeardown::default();
    let outcome = {
        let mut pipeline =
            ActionResolutionPipeline::new(&mut state, &mut rng, &table, &ledger, &config)
                .with_teardown(&mut teardown);
        emitted(
            pipeline
                .resolve(CastRequest::new(WARLORD, AbilityId::ChaosBolt))
                .expect("chaos bolt should resolve"),
        )
    };

    assert_eq!(outcome.reports[0].retaliation, 5);
    assert_eq!(hp(&state, WARLORD), 0);
    assert_eq!(stacks(&state, WARLORD, StatusKind::Poison), 0);
    assert_eq!(teardown.0, vec![(WARLORD, StatusKind::Mirror)]);
}

#[test]
fn invalid_casts_are_rejected_with_severity() {
    let mut state = battle(AbsoluteSide::Host);
    let config = BattleConfig::default();
    let mut rng = PcgRandom::new(1);

    let err = cast(&mut state, &mut rng, &config, CombatantId(99), AbilityId::Firebolt)
        .expect_err("unknown caster");
    assert_eq!(err, PipelineError::CasterNotFound(CombatantId(99)));
    assert_eq!(err.severity(), ErrorSeverity::Validation);

    let err = cast(&mut state, &mut rng, &config, CLERIC, AbilityId::Firebolt)
        .expect_err("cleric never learned firebolt");
    assert!(matches!(err, PipelineError::AbilityNotLearned { .. }));
    assert!(err.severity().is_recoverable());

    combatant_mut(&mut state, CLERIC).ability_levels.insert(AbilityId::Sanctuary, 1);
    let err = cast(&mut state, &mut rng, &config, CLERIC, AbilityId::Sanctuary)
        .expect_err("no profile for sanctuary");
    assert_eq!(err.error_code(), "PIPELINE_ABILITY_NOT_FOUND");

    kill(&mut state, SORCERER);
    let err = cast(&mut state, &mut rng, &config, SORCERER, AbilityId::Firebolt)
        .expect_err("dead casters do not act");
    assert_eq!(err, PipelineError::CasterDead(SORCERER));
}
