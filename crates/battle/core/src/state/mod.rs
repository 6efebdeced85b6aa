//! Battle state owned by one peer.
//!
//! [`BattleState`] is created at battle start, mutated only by the host's
//! pipeline or by replaying a received outcome, and torn down by
//! [`BattleState::end_battle`]. Rosters are stored in the peer's local framing
//! (`Player` is always "mine"); [`TargetDescriptor`]s carry the absolute side so
//! the other peer can translate them.
#[cfg(feature = "serde")]
mod root;
pub mod types;

#[cfg(feature = "serde")]
pub use root::convergence_root;
pub use types::*;

use crate::config::BattleConfig;
use crate::env::StatusTeardown;
use crate::error::{BattleError, ErrorSeverity};

/// Errors raised while building or addressing battle state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("slot {position:?} on the {side:?} side is already taken")]
    SlotOccupied { side: LocalSide, position: Slot },

    #[error("no hero at slot {position:?} on the {side:?} side")]
    HeroNotFound { side: LocalSide, position: Slot },

    #[error("hero at {0} cannot own more creatures")]
    TooManyCreatures(TargetDescriptor),

    #[error("combatant id {0} is already in use")]
    DuplicateId(CombatantId),

    #[error("combatant {0} is not part of this battle")]
    UnknownCombatant(CombatantId),

    #[error("no combatant at {0}")]
    MissingTarget(TargetDescriptor),

    #[error("descriptor {0} is malformed or framed for the other peer")]
    MalformedDescriptor(TargetDescriptor),

    #[error(transparent)]
    Status(#[from] types::StatusError),
}

impl BattleError for StateError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Status(_) => ErrorSeverity::Internal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::SlotOccupied { .. } => "STATE_SLOT_OCCUPIED",
            Self::HeroNotFound { .. } => "STATE_HERO_NOT_FOUND",
            Self::TooManyCreatures(_) => "STATE_TOO_MANY_CREATURES",
            Self::DuplicateId(_) => "STATE_DUPLICATE_ID",
            Self::UnknownCombatant(_) => "STATE_UNKNOWN_COMBATANT",
            Self::MissingTarget(_) => "STATE_MISSING_TARGET",
            Self::MalformedDescriptor(_) => "STATE_MALFORMED_DESCRIPTOR",
            Self::Status(_) => "STATE_STATUS_FULL",
        }
    }
}

/// Stack count of a permanent effect, as handed to save/resume snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedStack {
    pub combatant: CombatantId,
    pub kind: StatusKind,
    pub stacks: u32,
}

/// Complete battle state as seen by one peer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleState {
    pub battle_id: u64,
    /// Absolute side this peer plays; its combatants are the `Player` side.
    me: AbsoluteSide,
    pub turn: Turn,
    /// Monotonic outcome timestamp.
    clock: u64,
    player: SideRoster,
    opponent: SideRoster,
}

impl BattleState {
    pub fn new(battle_id: u64, me: AbsoluteSide) -> Self {
        Self {
            battle_id,
            me,
            turn: Turn::FIRST,
            clock: 0,
            player: SideRoster::default(),
            opponent: SideRoster::default(),
        }
    }

    pub fn me(&self) -> AbsoluteSide {
        self.me
    }

    pub fn local_side_of(&self, absolute: AbsoluteSide) -> LocalSide {
        absolute.to_local(self.me)
    }

    pub fn absolute_side_of(&self, side: LocalSide) -> AbsoluteSide {
        AbsoluteSide::from_local(side, self.me)
    }

    pub fn roster(&self, side: LocalSide) -> &SideRoster {
        match side {
            LocalSide::Player => &self.player,
            LocalSide::Opponent => &self.opponent,
        }
    }

    fn roster_mut(&mut self, side: LocalSide) -> &mut SideRoster {
        match side {
            LocalSide::Player => &mut self.player,
            LocalSide::Opponent => &mut self.opponent,
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Places a hero on a side in local framing.
    pub fn add_hero(
        &mut self,
        side: LocalSide,
        position: Slot,
        mut hero: Combatant,
    ) -> Result<TargetDescriptor, StateError> {
        if self.locate(hero.id).is_some() {
            return Err(StateError::DuplicateId(hero.id));
        }
        let roster = self.roster(side);
        if roster.hero(position).is_some() || roster.len() >= BattleConfig::MAX_HEROES_PER_SIDE {
            return Err(StateError::SlotOccupied { side, position });
        }

        let absolute_side = self.absolute_side_of(side);
        hero.kind = CombatantKind::Hero;
        hero.side = side;
        hero.absolute_side = absolute_side;
        hero.position = position;
        self.roster_mut(side).insert(Hero::new(hero));

        Ok(TargetDescriptor::hero(side, absolute_side, position))
    }

    /// Places a hero by absolute side, so both peers can share one setup routine.
    pub fn add_hero_at(
        &mut self,
        absolute: AbsoluteSide,
        position: Slot,
        hero: Combatant,
    ) -> Result<TargetDescriptor, StateError> {
        self.add_hero(self.local_side_of(absolute), position, hero)
    }

    /// Gives a creature to the hero addressed by `owner`.
    pub fn add_creature(
        &mut self,
        owner: &TargetDescriptor,
        mut creature: Combatant,
    ) -> Result<TargetDescriptor, StateError> {
        if self.locate(creature.id).is_some() {
            return Err(StateError::DuplicateId(creature.id));
        }
        let owner = owner.owning_hero();
        let (side, position) = (owner.side, owner.position);
        let hero = self
            .roster_mut(side)
            .hero_mut(position)
            .ok_or(StateError::HeroNotFound { side, position })?;
        if hero.creatures.len() >= BattleConfig::MAX_CREATURES_PER_HERO {
            return Err(StateError::TooManyCreatures(owner));
        }

        let index = hero.creatures.len() as u8;
        creature.kind = CombatantKind::Creature;
        creature.side = side;
        creature.absolute_side = owner.absolute_side;
        creature.position = position;
        hero.creatures.push(creature);

        Ok(TargetDescriptor::creature(
            side,
            owner.absolute_side,
            position,
            index,
        ))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Checks that a descriptor is well formed, framed for this peer and occupied.
    pub fn validate_descriptor(&self, descriptor: &TargetDescriptor) -> Result<(), StateError> {
        if !descriptor.is_well_formed()
            || descriptor.side != self.local_side_of(descriptor.absolute_side)
        {
            return Err(StateError::MalformedDescriptor(*descriptor));
        }
        self.combatant(descriptor)
            .map(|_| ())
            .ok_or(StateError::MissingTarget(*descriptor))
    }

    pub fn combatant(&self, descriptor: &TargetDescriptor) -> Option<&Combatant> {
        let hero = self.roster(descriptor.side).hero(descriptor.position)?;
        match descriptor.creature_index {
            None => Some(&hero.combatant),
            Some(index) => hero.creatures.get(usize::from(index)),
        }
    }

    pub fn combatant_mut(&mut self, descriptor: &TargetDescriptor) -> Option<&mut Combatant> {
        let hero = self
            .roster_mut(descriptor.side)
            .hero_mut(descriptor.position)?;
        match descriptor.creature_index {
            None => Some(&mut hero.combatant),
            Some(index) => hero.creatures.get_mut(usize::from(index)),
        }
    }

    pub fn get(&self, descriptor: &TargetDescriptor) -> Result<&Combatant, StateError> {
        self.combatant(descriptor)
            .ok_or(StateError::MissingTarget(*descriptor))
    }

    pub fn get_mut(&mut self, descriptor: &TargetDescriptor) -> Result<&mut Combatant, StateError> {
        self.combatant_mut(descriptor)
            .ok_or(StateError::MissingTarget(*descriptor))
    }

    /// Applies realized damage to the addressed combatant.
    pub fn apply_damage(
        &mut self,
        descriptor: &TargetDescriptor,
        shield_absorbed: u32,
        hp_lost: u32,
        teardown: &mut dyn StatusTeardown,
    ) -> Result<DamageReport, StateError> {
        let combatant = self.get_mut(descriptor)?;
        Ok(combatant.take_damage(shield_absorbed, hp_lost, teardown))
    }

    /// Finds the descriptor of a combatant by id.
    pub fn locate(&self, id: CombatantId) -> Option<TargetDescriptor> {
        self.all()
            .find(|(_, combatant)| combatant.id == id)
            .map(|(descriptor, _)| descriptor)
    }

    /// Heroes of a side in slot order.
    pub fn heroes(
        &self,
        side: LocalSide,
    ) -> impl Iterator<Item = (TargetDescriptor, &Combatant)> + '_ {
        let absolute = self.absolute_side_of(side);
        self.roster(side).heroes().iter().map(move |hero| {
            (
                TargetDescriptor::hero(side, absolute, hero.position()),
                &hero.combatant,
            )
        })
    }

    /// Creatures of a side, grouped by owning hero in slot order.
    pub fn creatures(
        &self,
        side: LocalSide,
    ) -> impl Iterator<Item = (TargetDescriptor, &Combatant)> + '_ {
        let absolute = self.absolute_side_of(side);
        self.roster(side).heroes().iter().flat_map(move |hero| {
            hero.creatures.iter().enumerate().map(move |(index, creature)| {
                (
                    TargetDescriptor::creature(side, absolute, hero.position(), index as u8),
                    creature,
                )
            })
        })
    }

    /// Heroes then creatures of one side.
    pub fn combatants(
        &self,
        side: LocalSide,
    ) -> impl Iterator<Item = (TargetDescriptor, &Combatant)> + '_ {
        self.heroes(side).chain(self.creatures(side))
    }

    /// Every combatant of both sides, player side first.
    pub fn all(&self) -> impl Iterator<Item = (TargetDescriptor, &Combatant)> + '_ {
        self.combatants(LocalSide::Player)
            .chain(self.combatants(LocalSide::Opponent))
    }

    // ========================================================================
    // Progression
    // ========================================================================

    pub fn advance_turn(&mut self) -> Turn {
        self.turn = self.turn.next();
        self.turn
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Issues the next outcome timestamp.
    pub fn next_timestamp(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Advances the clock past a replicated timestamp.
    pub fn observe_timestamp(&mut self, timestamp: u64) {
        self.clock = self.clock.max(timestamp);
    }

    /// Drops every status record and resistance charge at battle end.
    pub fn end_battle(&mut self) {
        for side in [LocalSide::Player, LocalSide::Opponent] {
            for hero in self.roster_mut(side).heroes_mut() {
                for combatant in std::iter::once(&mut hero.combatant).chain(hero.creatures.iter_mut())
                {
                    combatant.status.clear();
                    combatant.resistance.clear();
                }
            }
        }
    }

    // ========================================================================
    // Persisted-state boundary
    // ========================================================================

    /// Stack counts of permanent effects, keyed by combatant id and kind.
    pub fn persisted_stacks(&self) -> Vec<PersistedStack> {
        self.all()
            .flat_map(|(_, combatant)| {
                combatant
                    .status
                    .iter()
                    .filter(|record| record.permanent)
                    .map(|record| PersistedStack {
                        combatant: combatant.id,
                        kind: record.kind,
                        stacks: record.stacks,
                    })
            })
            .collect()
    }

    /// Restores permanent stacks from a save/resume snapshot.
    pub fn restore_persisted(&mut self, stacks: &[PersistedStack]) -> Result<(), StateError> {
        let turn = self.turn;
        for entry in stacks {
            let descriptor = self
                .locate(entry.combatant)
                .ok_or(StateError::UnknownCombatant(entry.combatant))?;
            let combatant = self.get_mut(&descriptor)?;
            combatant
                .status
                .apply_op(entry.kind, StackOp::Set(entry.stacks), turn)?;
            combatant.status.set_permanent(entry.kind, true);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state(me: AbsoluteSide) -> BattleState {
        let mut state = BattleState::new(1, me);
        let host_hero = state
            .add_hero_at(
                AbsoluteSide::Host,
                Slot::Center,
                Combatant::hero(CombatantId(1), "Knight", 100),
            )
            .unwrap();
        state
            .add_creature(&host_hero, Combatant::creature(CombatantId(2), "Wolf", 30))
            .unwrap();
        state
            .add_hero_at(
                AbsoluteSide::Guest,
                Slot::Left,
                Combatant::hero(CombatantId(3), "Witch", 90),
            )
            .unwrap();
        state
    }

    #[test]
    fn rosters_are_framed_locally() {
        let host = sample_state(AbsoluteSide::Host);
        let guest = sample_state(AbsoluteSide::Guest);

        let knight_on_host = host.locate(CombatantId(1)).unwrap();
        let knight_on_guest = guest.locate(CombatantId(1)).unwrap();

        assert_eq!(knight_on_host.side, LocalSide::Player);
        assert_eq!(knight_on_guest.side, LocalSide::Opponent);
        assert_eq!(knight_on_host.address(), knight_on_guest.address());
        assert_eq!(knight_on_host.localize(AbsoluteSide::Guest), knight_on_guest);
    }

    #[test]
    fn creatures_are_addressed_through_their_hero() {
        let state = sample_state(AbsoluteSide::Host);
        let wolf = state.locate(CombatantId(2)).unwrap();

        assert_eq!(wolf.kind, CombatantKind::Creature);
        assert_eq!(wolf.position, Slot::Center);
        assert_eq!(wolf.creature_index, Some(0));
        assert_eq!(state.get(&wolf).unwrap().name, "Wolf");
    }

    #[test]
    fn rejects_duplicate_ids_and_taken_slots() {
        let mut state = sample_state(AbsoluteSide::Host);

        let duplicate = state.add_hero(
            LocalSide::Player,
            Slot::Right,
            Combatant::hero(CombatantId(1), "Clone", 10),
        );
        assert_eq!(duplicate, Err(StateError::DuplicateId(CombatantId(1))));

        let taken = state.add_hero(
            LocalSide::Player,
            Slot::Center,
            Combatant::hero(CombatantId(9), "Squire", 10),
        );
        assert!(matches!(taken, Err(StateError::SlotOccupied { .. })));
    }

    #[test]
    fn descriptors_framed_for_the_other_peer_are_rejected() {
        let host = sample_state(AbsoluteSide::Host);
        let guest = sample_state(AbsoluteSide::Guest);

        let knight_on_host = host.locate(CombatantId(1)).unwrap();
        assert!(matches!(
            guest.validate_descriptor(&knight_on_host),
            Err(StateError::MalformedDescriptor(_))
        ));
        assert!(
            guest
                .validate_descriptor(&knight_on_host.localize(AbsoluteSide::Guest))
                .is_ok()
        );
    }

    #[test]
    fn persisted_stacks_cover_only_permanent_effects() {
        let mut state = sample_state(AbsoluteSide::Host);
        let knight = state.locate(CombatantId(1)).unwrap();
        {
            let combatant = state.get_mut(&knight).unwrap();
            combatant.status.apply(StatusKind::Fury, 3, Turn(1));
            combatant.status.apply(StatusKind::Burn, 2, Turn(1));
        }

        let saved = state.persisted_stacks();
        assert_eq!(
            saved,
            vec![PersistedStack {
                combatant: CombatantId(1),
                kind: StatusKind::Fury,
                stacks: 3,
            }]
        );

        state.end_battle();
        assert!(state.get(&knight).unwrap().status.is_empty());

        state.restore_persisted(&saved).unwrap();
        assert_eq!(state.get(&knight).unwrap().status.stacks_of(StatusKind::Fury), 3);
    }

    #[test]
    fn timestamps_are_monotonic() {
        let mut state = sample_state(AbsoluteSide::Guest);
        assert_eq!(state.next_timestamp(), 1);
        state.observe_timestamp(10);
        state.observe_timestamp(4);
        assert_eq!(state.next_timestamp(), 11);
    }
}
