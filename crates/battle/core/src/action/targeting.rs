//! Targeting rules and target selection.
//!
//! Selection is a family of pure functions over `(&BattleState, caster, rng)`.
//! They never look at presentation state, so the same battle state and the
//! same draws always yield the same descriptors. Only the host runs them.

use crate::config::BattleConfig;
use crate::env::{RandomSource, RandomSourceExt};
use crate::state::{BattleState, Combatant, LocalSide, StatusKind, TargetDescriptor};

/// Probability bands for the priority-random fallback roll.
///
/// A single uniform draw below `hero` picks the enemy heroes; below
/// `hero + ally` picks the caster's own side. The rest resolves to no target.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallbackBands {
    pub hero: f64,
    pub ally: f64,
}

impl FallbackBands {
    pub const fn new(hero: f64, ally: f64) -> Self {
        Self { hero, ally }
    }

    /// Chance that the fallback roll selects nothing.
    pub fn residual(&self) -> f64 {
        (1.0 - self.hero - self.ally).max(0.0)
    }
}

impl Default for FallbackBands {
    fn default() -> Self {
        Self::new(BattleConfig::DEFAULT_HERO_BAND, BattleConfig::DEFAULT_ALLY_BAND)
    }
}

/// Which side an area rule covers, relative to the caster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    Allies,
    Enemies,
}

/// Per-target predicate. Living is always required on top of these.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Eligibility {
    /// Target holds no stacks of the kind.
    WithoutStatus(StatusKind),
    /// Target holds no resistance charge.
    NoResistance,
    /// Target's HP fraction is strictly below the value.
    HpBelow(f64),
    /// Target has no shield.
    NoShield,
}

impl Eligibility {
    pub fn admits(&self, combatant: &Combatant) -> bool {
        match *self {
            Self::WithoutStatus(kind) => !combatant.status.has(kind),
            Self::NoResistance => !combatant.resistance.has_charge(),
            Self::HpBelow(fraction) => combatant.hp_fraction() < fraction,
            Self::NoShield => combatant.current_shield == 0,
        }
    }
}

/// Need score used by most-needy targeting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeedMetric {
    /// Absolute missing HP.
    MissingHp,
    /// Missing HP as a fraction of max HP.
    MissingHpFraction,
    /// Unshielded combatants only, most wounded first.
    ShieldAbsent,
}

impl NeedMetric {
    pub fn need(&self, combatant: &Combatant) -> f64 {
        match self {
            Self::MissingHp => f64::from(combatant.missing_hp()),
            Self::MissingHpFraction => 1.0 - combatant.hp_fraction(),
            Self::ShieldAbsent => {
                if combatant.current_shield == 0 {
                    2.0 - combatant.hp_fraction()
                } else {
                    0.0
                }
            }
        }
    }
}

/// How an ability selects its targets.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetingRule {
    /// The caster only.
    SelfOnly,

    /// One living enemy, uniformly at random.
    SingleRandom,

    /// Enemy creatures first, then a banded roll between enemy heroes and the
    /// caster's own side. `None` uses the configured bands.
    PriorityRandom { bands: Option<FallbackBands> },

    /// Every living enemy creature, or every living enemy hero if none remain.
    AllEnemiesCreaturePriority,

    /// The single ally with the highest need, with the caster deprioritized.
    /// `None` uses the configured self-preference threshold.
    MostNeedy {
        eligibility: Vec<Eligibility>,
        metric: NeedMetric,
        threshold: Option<f64>,
    },

    /// Every living combatant of a side that passes all predicates.
    AllQualifying {
        scope: Scope,
        eligibility: Vec<Eligibility>,
    },
}

/// Resolves targets for `caster` under `rule`. An empty result means no target.
pub fn resolve(
    rule: &TargetingRule,
    state: &BattleState,
    caster: &TargetDescriptor,
    config: &BattleConfig,
    rng: &mut dyn RandomSource,
) -> Vec<TargetDescriptor> {
    match rule {
        TargetingRule::SelfOnly => self_only(state, caster),
        TargetingRule::SingleRandom => single_random(state, caster, rng).into_iter().collect(),
        TargetingRule::PriorityRandom { bands } => {
            let bands = bands.unwrap_or(config.fallback_bands);
            priority_random(state, caster, bands, rng)
                .into_iter()
                .collect()
        }
        TargetingRule::AllEnemiesCreaturePriority => all_enemies_creature_priority(state, caster),
        TargetingRule::MostNeedy {
            eligibility,
            metric,
            threshold,
        } => {
            let threshold = threshold.unwrap_or(config.self_preference_threshold);
            most_needy(state, caster, eligibility, *metric, threshold)
                .into_iter()
                .collect()
        }
        TargetingRule::AllQualifying { scope, eligibility } => {
            all_qualifying(state, caster, *scope, eligibility)
        }
    }
}

fn living<'a>(
    iter: impl Iterator<Item = (TargetDescriptor, &'a Combatant)>,
) -> impl Iterator<Item = (TargetDescriptor, &'a Combatant)> {
    iter.filter(|(_, combatant)| combatant.alive)
}

fn enemies_of(caster: &TargetDescriptor) -> LocalSide {
    caster.side.opposite()
}

/// The caster, if still alive.
pub fn self_only(state: &BattleState, caster: &TargetDescriptor) -> Vec<TargetDescriptor> {
    state
        .combatant(caster)
        .filter(|combatant| combatant.alive)
        .map(|_| vec![*caster])
        .unwrap_or_default()
}

/// One living enemy (heroes then creatures), uniformly at random.
pub fn single_random(
    state: &BattleState,
    caster: &TargetDescriptor,
    rng: &mut dyn RandomSource,
) -> Option<TargetDescriptor> {
    let pool: Vec<TargetDescriptor> = living(state.combatants(enemies_of(caster)))
        .map(|(descriptor, _)| descriptor)
        .collect();
    rng.choice(&pool).copied()
}

/// Priority-random selection with graduated fallback.
///
/// Living enemy creatures are picked uniformly. When none remain, one roll
/// chooses between enemy heroes and the caster's side (excluding the caster);
/// a roll outside both bands, or a chosen pool that is empty, yields `None`.
pub fn priority_random(
    state: &BattleState,
    caster: &TargetDescriptor,
    bands: FallbackBands,
    rng: &mut dyn RandomSource,
) -> Option<TargetDescriptor> {
    let enemy = enemies_of(caster);
    let creatures: Vec<TargetDescriptor> = living(state.creatures(enemy))
        .map(|(descriptor, _)| descriptor)
        .collect();
    if !creatures.is_empty() {
        return rng.choice(&creatures).copied();
    }

    let roll = rng.uniform();
    let pool: Vec<TargetDescriptor> = if roll < bands.hero {
        living(state.heroes(enemy))
            .map(|(descriptor, _)| descriptor)
            .collect()
    } else if roll < bands.hero + bands.ally {
        living(state.combatants(caster.side))
            .map(|(descriptor, _)| descriptor)
            .filter(|descriptor| descriptor != caster)
            .collect()
    } else {
        tracing::debug!(roll, "priority fallback landed in the residual band");
        return None;
    };

    rng.choice(&pool).copied()
}

/// All living enemy creatures, or all living enemy heroes when no creature is left.
pub fn all_enemies_creature_priority(
    state: &BattleState,
    caster: &TargetDescriptor,
) -> Vec<TargetDescriptor> {
    let enemy = enemies_of(caster);
    let creatures: Vec<TargetDescriptor> = living(state.creatures(enemy))
        .map(|(descriptor, _)| descriptor)
        .collect();
    if !creatures.is_empty() {
        return creatures;
    }
    living(state.heroes(enemy))
        .map(|(descriptor, _)| descriptor)
        .collect()
}

/// The eligible ally with the highest need.
///
/// Candidates with zero need are skipped. Ties keep enumeration order (heroes
/// in slot order, then creatures). The caster only wins when its own need is
/// at least `threshold` times the best other candidate's need.
pub fn most_needy(
    state: &BattleState,
    caster: &TargetDescriptor,
    eligibility: &[Eligibility],
    metric: NeedMetric,
    threshold: f64,
) -> Option<TargetDescriptor> {
    let mut candidates: Vec<(TargetDescriptor, f64)> = living(state.combatants(caster.side))
        .filter(|(_, combatant)| eligibility.iter().all(|rule| rule.admits(combatant)))
        .map(|(descriptor, combatant)| (descriptor, metric.need(combatant)))
        .filter(|(_, need)| *need > 0.0)
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

    let best_self = candidates.iter().find(|(descriptor, _)| descriptor == caster);
    let best_other = candidates.iter().find(|(descriptor, _)| descriptor != caster);

    match (best_self, best_other) {
        (Some(&(me, self_need)), Some(&(other, other_need))) => {
            if self_need < threshold * other_need {
                Some(other)
            } else {
                Some(me)
            }
        }
        (Some(&(me, _)), None) => Some(me),
        (None, Some(&(other, _))) => Some(other),
        (None, None) => None,
    }
}

/// Every living combatant of the scoped side passing all predicates.
pub fn all_qualifying(
    state: &BattleState,
    caster: &TargetDescriptor,
    scope: Scope,
    eligibility: &[Eligibility],
) -> Vec<TargetDescriptor> {
    let side = match scope {
        Scope::Allies => caster.side,
        Scope::Enemies => enemies_of(caster),
    };
    living(state.combatants(side))
        .filter(|(_, combatant)| eligibility.iter().all(|rule| rule.admits(combatant)))
        .map(|(descriptor, _)| descriptor)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PcgRandom, ScriptedRandom};
    use crate::state::{AbsoluteSide, CombatantId, Slot, Turn};

    struct Board {
        state: BattleState,
        caster: TargetDescriptor,
    }

    fn board() -> Board {
        let mut state = BattleState::new(1, AbsoluteSide::Host);
        let caster = state
            .add_hero(
                LocalSide::Player,
                Slot::Left,
                Combatant::hero(CombatantId(1), "Sorcerer", 100),
            )
            .unwrap();
        state
            .add_hero(
                LocalSide::Player,
                Slot::Right,
                Combatant::hero(CombatantId(2), "Cleric", 100),
            )
            .unwrap();
        let enemy = state
            .add_hero(
                LocalSide::Opponent,
                Slot::Center,
                Combatant::hero(CombatantId(10), "Warlord", 120),
            )
            .unwrap();
        state
            .add_creature(&enemy, Combatant::creature(CombatantId(11), "Imp", 20))
            .unwrap();
        state
            .add_creature(&enemy, Combatant::creature(CombatantId(12), "Ghoul", 25))
            .unwrap();
        Board { state, caster }
    }

    fn kill(state: &mut BattleState, id: CombatantId) {
        let descriptor = state.locate(id).unwrap();
        let combatant = state.get_mut(&descriptor).unwrap();
        combatant.current_hp = 0;
        combatant.alive = false;
    }

    fn ids(state: &BattleState, targets: &[TargetDescriptor]) -> Vec<u32> {
        targets.iter().map(|t| state.get(t).unwrap().id.0).collect()
    }

    #[test]
    fn priority_random_prefers_enemy_creatures() {
        let Board { state, caster } = board();
        let mut rng = PcgRandom::new(5);
        for _ in 0..20 {
            let target = priority_random(&state, &caster, FallbackBands::default(), &mut rng)
                .unwrap();
            assert_eq!(target.kind, crate::state::CombatantKind::Creature);
            assert_eq!(target.side, LocalSide::Opponent);
        }
    }

    #[test]
    fn priority_fallback_draws_only_from_the_rolled_band() {
        let Board { mut state, caster } = board();
        kill(&mut state, CombatantId(11));
        kill(&mut state, CombatantId(12));
        let bands = FallbackBands::new(0.5, 0.3);

        // Hero band.
        let mut rng = ScriptedRandom::new([0.2, 0.0]);
        let target = priority_random(&state, &caster, bands, &mut rng).unwrap();
        assert_eq!(state.get(&target).unwrap().id, CombatantId(10));

        // Ally band never returns the caster.
        for pick in [0.0, 0.99] {
            let mut rng = ScriptedRandom::new([0.6, pick]);
            let target = priority_random(&state, &caster, bands, &mut rng).unwrap();
            assert_eq!(state.get(&target).unwrap().id, CombatantId(2));
        }

        // Residual band.
        let mut rng = ScriptedRandom::new([0.9]);
        assert_eq!(priority_random(&state, &caster, bands, &mut rng), None);
    }

    #[test]
    fn priority_fallback_with_empty_pools_is_none() {
        let Board { mut state, caster } = board();
        for id in [2, 10, 11, 12] {
            kill(&mut state, CombatantId(id));
        }
        for roll in [0.1, 0.6, 0.95] {
            let mut rng = ScriptedRandom::new([roll]);
            assert_eq!(
                priority_random(&state, &caster, FallbackBands::default(), &mut rng),
                None
            );
        }
    }

    #[test]
    fn area_damage_never_mixes_creatures_and_heroes() {
        let Board { mut state, caster } = board();
        let targets = all_enemies_creature_priority(&state, &caster);
        assert_eq!(ids(&state, &targets), vec![11, 12]);

        kill(&mut state, CombatantId(11));
        kill(&mut state, CombatantId(12));
        let targets = all_enemies_creature_priority(&state, &caster);
        assert_eq!(ids(&state, &targets), vec![10]);
    }

    #[test]
    fn self_loses_unless_clearly_needier() {
        let Board { mut state, caster } = board();
        let cleric = state.locate(CombatantId(2)).unwrap();
        state.get_mut(&caster).unwrap().current_hp = 60;
        state.get_mut(&cleric).unwrap().current_hp = 70;

        // Self missing 40, other missing 30: 40 < 1.5 × 30.
        let target = most_needy(&state, &caster, &[], NeedMetric::MissingHp, 1.5).unwrap();
        assert_eq!(target, cleric);

        // Self missing 50, other missing 30: 50 >= 45.
        state.get_mut(&caster).unwrap().current_hp = 50;
        let target = most_needy(&state, &caster, &[], NeedMetric::MissingHp, 1.5).unwrap();
        assert_eq!(target, caster);
    }

    #[test]
    fn most_needy_respects_eligibility_and_skips_healthy() {
        let Board { mut state, caster } = board();
        let cleric = state.locate(CombatantId(2)).unwrap();
        assert_eq!(
            most_needy(&state, &caster, &[], NeedMetric::MissingHp, 1.5),
            None
        );

        {
            let combatant = state.get_mut(&cleric).unwrap();
            combatant.current_hp = 10;
            combatant.status.apply(StatusKind::HealBlock, 1, Turn(1));
        }
        state.get_mut(&caster).unwrap().current_hp = 95;

        let filter = [Eligibility::WithoutStatus(StatusKind::HealBlock)];
        let target = most_needy(&state, &caster, &filter, NeedMetric::MissingHp, 1.5).unwrap();
        assert_eq!(target, caster);
    }

    #[test]
    fn shield_need_ignores_shielded_allies() {
        let Board { mut state, caster } = board();
        let cleric = state.locate(CombatantId(2)).unwrap();
        state.get_mut(&caster).unwrap().current_shield = 10;

        let target = most_needy(&state, &caster, &[], NeedMetric::ShieldAbsent, 1.5).unwrap();
        assert_eq!(target, cleric);
    }

    #[test]
    fn area_heal_excludes_heal_blocked_targets() {
        let Board { mut state, caster } = board();
        let cleric = state.locate(CombatantId(2)).unwrap();
        state
            .get_mut(&cleric)
            .unwrap()
            .status
            .apply(StatusKind::HealBlock, 2, Turn(1));

        let filter = [Eligibility::WithoutStatus(StatusKind::HealBlock)];
        let targets = all_qualifying(&state, &caster, Scope::Allies, &filter);
        assert_eq!(targets, vec![caster]);
        for target in &targets {
            assert_eq!(
                state.get(target).unwrap().status.stacks_of(StatusKind::HealBlock),
                0
            );
        }
    }

    #[test]
    fn hp_threshold_filters_enemies() {
        let Board { mut state, caster } = board();
        let warlord = state.locate(CombatantId(10)).unwrap();
        state.get_mut(&warlord).unwrap().current_hp = 30;

        let targets = all_qualifying(&state, &caster, Scope::Enemies, &[Eligibility::HpBelow(0.5)]);
        assert_eq!(targets, vec![warlord]);
    }

    #[test]
    fn self_only_requires_a_living_caster() {
        let Board { mut state, caster } = board();
        assert_eq!(self_only(&state, &caster), vec![caster]);
        kill(&mut state, CombatantId(1));
        assert!(self_only(&state, &caster).is_empty());
    }
}
