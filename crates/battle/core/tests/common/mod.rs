//! Shared battle fixture for integration tests.
#![allow(dead_code)]

use battle_core::{
    AbilityId, AbilityProfile, AbilityTable, AbsoluteSide, BattleState, Combatant, CombatantId,
    EffectSpec, Eligibility, Formula, NeedMetric, Scope, Slot, StatusKind, TargetingRule,
};

pub const SORCERER: CombatantId = CombatantId(1);
pub const CLERIC: CombatantId = CombatantId(2);
pub const WARLORD: CombatantId = CombatantId(10);
pub const IMP: CombatantId = CombatantId(11);
pub const GHOUL: CombatantId = CombatantId(12);

/// Builds the same two-sided battle from either peer's point of view.
///
/// Host side: Sorcerer (left), Cleric (right).
/// Guest side: Warlord (center) owning an Imp and a Ghoul.
pub fn battle(me: AbsoluteSide) -> BattleState {
    let mut state = BattleState::new(7, me);
    state
        .add_hero_at(
            AbsoluteSide::Host,
            Slot::Left,
            Combatant::hero(SORCERER, "Sorcerer", 100)
                .with_ability(AbilityId::Firebolt, 1)
                .with_ability(AbilityId::ChaosBolt, 1)
                .with_ability(AbilityId::Blizzard, 1)
                .with_ability(AbilityId::Frenzy, 1)
                .with_ability(AbilityId::Renewal, 1),
        )
        .expect("sorcerer should be placed");
    state
        .add_hero_at(
            AbsoluteSide::Host,
            Slot::Right,
            Combatant::hero(CLERIC, "Cleric", 100)
                .with_ability(AbilityId::Mend, 1)
                .with_ability(AbilityId::Thornskin, 1)
                .with_ability(AbilityId::MirrorImage, 1),
        )
        .expect("cleric should be placed");
    let warlord = state
        .add_hero_at(
            AbsoluteSide::Guest,
            Slot::Center,
            Combatant::hero(WARLORD, "Warlord", 120)
                .with_ability(AbilityId::ChaosBolt, 1)
                .with_ability(AbilityId::Hex, 1),
        )
        .expect("warlord should be placed");
    state
        .add_creature(&warlord, Combatant::creature(IMP, "Imp", 20).with_resistance(1))
        .expect("imp should be placed");
    state
        .add_creature(&warlord, Combatant::creature(GHOUL, "Ghoul", 25))
        .expect("ghoul should be placed");
    state
}

pub fn abilities() -> AbilityTable {
    AbilityTable::from_profiles([
        AbilityProfile::new(
            AbilityId::Firebolt,
            TargetingRule::PriorityRandom { bands: None },
            EffectSpec::Damage,
            Formula::linear(20, 5),
        )
        .resistible()
        .with_rider(StatusKind::Burn, 1),
        AbilityProfile::new(
            AbilityId::ChaosBolt,
            TargetingRule::SingleRandom,
            EffectSpec::Damage,
            Formula::flat(30),
        )
        .resistible(),
        AbilityProfile::new(
            AbilityId::Blizzard,
            TargetingRule::AllEnemiesCreaturePriority,
            EffectSpec::Damage,
            Formula::flat(10),
        )
        .resistible()
        .with_rider(StatusKind::Frost, 1),
        AbilityProfile::new(
            AbilityId::Frenzy,
            TargetingRule::SingleRandom,
            EffectSpec::Damage,
            Formula::flat(10).with_self_stacks(StatusKind::Fury, 25),
        )
        .with_self_stack(StatusKind::Fury, 1),
        AbilityProfile::new(
            AbilityId::Mend,
            TargetingRule::MostNeedy {
                eligibility: vec![],
                metric: NeedMetric::MissingHp,
                threshold: None,
            },
            EffectSpec::Heal,
            Formula::flat(30),
        ),
        AbilityProfile::new(
            AbilityId::Renewal,
            TargetingRule::AllQualifying {
                scope: Scope::Allies,
                eligibility: vec![Eligibility::WithoutStatus(StatusKind::HealBlock)],
            },
            EffectSpec::Heal,
            Formula::flat(20),
        ),
        AbilityProfile::new(
            AbilityId::Thornskin,
            TargetingRule::SelfOnly,
            EffectSpec::ApplyStatus(StatusKind::Thorns),
            Formula::flat(2),
        ),
        AbilityProfile::new(
            AbilityId::MirrorImage,
            TargetingRule::SelfOnly,
            EffectSpec::ApplyStatus(StatusKind::Mirror),
            Formula::flat(2),
        ),
        AbilityProfile::new(
            AbilityId::Hex,
            TargetingRule::SingleRandom,
            EffectSpec::ApplyStatus(StatusKind::HealBlock),
            Formula::flat(2),
        )
        .resistible(),
    ])
}

pub fn hp(state: &BattleState, id: CombatantId) -> u32 {
    let descriptor = state.locate(id).expect("combatant should exist");
    state.get(&descriptor).expect("descriptor should resolve").current_hp
}

pub fn stacks(state: &BattleState, id: CombatantId, kind: StatusKind) -> u32 {
    let descriptor = state.locate(id).expect("combatant should exist");
    state
        .get(&descriptor)
        .expect("descriptor should resolve")
        .status
        .stacks_of(kind)
}

pub fn combatant_mut(state: &mut BattleState, id: CombatantId) -> &mut Combatant {
    let descriptor = state.locate(id).expect("combatant should exist");
    state.get_mut(&descriptor).expect("descriptor should resolve")
}

pub fn kill(state: &mut BattleState, id: CombatantId) {
    let combatant = combatant_mut(state, id);
    combatant.current_hp = 0;
    combatant.alive = false;
    combatant.status.clear();
}
