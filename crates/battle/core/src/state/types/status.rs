//! Stacking status effect system for combatants.
//!
//! Every combatant owns one [`StatusEffectStore`] holding at most one
//! [`StatusEffectRecord`] per [`StatusKind`]. How a kind merges, whether it
//! survives until battle end, and which trigger it carries are looked up in the
//! per-kind [`StatusRule`] table rather than decided at call sites.
//!
//! # Stacks
//!
//! A record with zero stacks is equivalent to absence and is never retained.
//! Counted-duration decay is driven by the turn loop outside this crate; the
//! store only exposes `apply`, `remove` and `prune_zero`.

use arrayvec::ArrayVec;
use bitflags::bitflags;

use crate::config::BattleConfig;
use crate::env::StatusTeardown;
use crate::state::{CombatantId, Turn};

/// Types of status effects.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::EnumIter, strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatusKind {
    // ========================================================================
    // Debuffs
    // ========================================================================
    /// Fire damage over time.
    Burn,

    /// Poison damage over time.
    Poison,

    /// Slows the holder; stacks accumulate.
    Frost,

    /// Skips the holder's next actions; a fresh stun replaces the old count.
    Stun,

    /// Holder cannot be healed.
    HealBlock,

    /// Reduced outgoing damage. Imposed on attackers by a redirect.
    Weakness,

    // ========================================================================
    // Buffs
    // ========================================================================
    /// Reflects damage back at attackers from the turn after it was cast.
    Thorns,

    /// Negates the next attack and turns it into weakness on the attacker.
    Mirror,

    /// Stacking self buff gained on hit.
    Fury,

    /// The holder's spells ignore resistance charges.
    Piercing,
}

/// How a repeated application merges into an existing record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackPolicy {
    /// New stacks are added to existing stacks.
    Additive,
    /// New stacks replace existing stacks.
    Set,
}

bitflags! {
    /// Static properties of a status kind.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct StatusFlags: u8 {
        /// Harmful to the holder.
        const DEBUFF = 1 << 0;
        /// Lasts for the whole battle instead of a counted duration.
        const PERMANENT = 1 << 1;
        /// Applications record the turn they were cast on.
        const TRACKS_CAST_TURN = 1 << 2;
        /// Needs bespoke teardown when the holder dies.
        const TEARDOWN_ON_DEATH = 1 << 3;
        /// Prevents the holder from receiving healing.
        const BLOCKS_HEALING = 1 << 4;
    }
}

/// Reaction a status kind performs when its holder is attacked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Damages the attacker by `stacks × per_stack × holder multiplier`.
    Retaliation { per_stack: u32 },
    /// Negates the attack and imposes `imposes` on the attacker.
    Redirect { imposes: StatusKind },
}

/// Merge, lifetime and trigger rules of one status kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StatusRule {
    pub policy: StackPolicy,
    pub flags: StatusFlags,
    pub trigger: Option<Trigger>,
}

impl StatusRule {
    const fn new(policy: StackPolicy, flags: StatusFlags) -> Self {
        Self {
            policy,
            flags,
            trigger: None,
        }
    }

    const fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

impl StatusKind {
    /// Rule table entry for this kind.
    pub const fn rule(self) -> StatusRule {
        use StackPolicy::{Additive, Set};
        match self {
            Self::Burn | Self::Poison | Self::Frost => {
                StatusRule::new(Additive, StatusFlags::DEBUFF)
            }
            Self::Stun => StatusRule::new(Set, StatusFlags::DEBUFF),
            Self::HealBlock => StatusRule::new(
                Set,
                StatusFlags::DEBUFF.union(StatusFlags::BLOCKS_HEALING),
            ),
            Self::Weakness => StatusRule::new(Additive, StatusFlags::DEBUFF),
            Self::Thorns => StatusRule::new(
                Additive,
                StatusFlags::PERMANENT.union(StatusFlags::TRACKS_CAST_TURN),
            )
            .with_trigger(Trigger::Retaliation { per_stack: 5 }),
            Self::Mirror => StatusRule::new(
                Additive,
                StatusFlags::PERMANENT.union(StatusFlags::TEARDOWN_ON_DEATH),
            )
            .with_trigger(Trigger::Redirect {
                imposes: Self::Weakness,
            }),
            Self::Fury => StatusRule::new(Additive, StatusFlags::PERMANENT),
            Self::Piercing => StatusRule::new(Set, StatusFlags::PERMANENT),
        }
    }

    pub const fn policy(self) -> StackPolicy {
        self.rule().policy
    }

    pub const fn trigger(self) -> Option<Trigger> {
        self.rule().trigger
    }

    pub fn has_flag(self, flag: StatusFlags) -> bool {
        self.rule().flags.contains(flag)
    }

    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Realized stack change, as carried by replicated mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackOp {
    Add(u32),
    Set(u32),
}

impl StackOp {
    /// The op a kind's policy produces for an application of `stacks`.
    pub fn for_kind(kind: StatusKind, stacks: u32) -> Self {
        match kind.policy() {
            StackPolicy::Additive => Self::Add(stacks),
            StackPolicy::Set => Self::Set(stacks),
        }
    }

    pub const fn amount(self) -> u32 {
        match self {
            Self::Add(n) | Self::Set(n) => n,
        }
    }
}

/// A single status effect record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectRecord {
    pub kind: StatusKind,
    pub stacks: u32,
    /// Battle-duration effect; persisted in save/resume snapshots.
    pub permanent: bool,
    pub applied_at: Turn,
    /// Turn of the latest application, for kinds flagged `TRACKS_CAST_TURN`.
    pub last_cast: Option<Turn>,
}

/// Errors raised by the status store.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StatusError {
    #[error("status store is full, cannot add {0:?}")]
    Full(StatusKind),
}

/// Active status effects on a combatant.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffectStore {
    records: ArrayVec<StatusEffectRecord, { BattleConfig::MAX_STATUS_EFFECTS }>,
}

impl StatusEffectStore {
    /// Creates an empty store.
    pub fn empty() -> Self {
        Self {
            records: ArrayVec::new(),
        }
    }

    /// Applies `stacks` of `kind` using the kind's stack policy.
    ///
    /// Returns false when nothing changed: zero stacks on an additive kind, or
    /// a new kind arriving while the store is full.
    pub fn apply(&mut self, kind: StatusKind, stacks: u32, turn: Turn) -> bool {
        self.apply_op(kind, StackOp::for_kind(kind, stacks), turn)
            .unwrap_or(false)
    }

    /// Applies an explicit stack op, regardless of the kind's policy.
    ///
    /// This is the primitive shared by host resolution and guest replay.
    pub fn apply_op(
        &mut self,
        kind: StatusKind,
        op: StackOp,
        turn: Turn,
    ) -> Result<bool, StatusError> {
        let rule = kind.rule();
        let marks_cast = rule.flags.contains(StatusFlags::TRACKS_CAST_TURN);

        if let Some(index) = self.records.iter().position(|r| r.kind == kind) {
            let record = &mut self.records[index];
            let stacks = match op {
                StackOp::Add(0) => return Ok(false),
                StackOp::Add(n) => record.stacks.saturating_add(n),
                StackOp::Set(n) => n,
            };
            if stacks == 0 {
                self.records.remove(index);
                return Ok(true);
            }
            record.stacks = stacks;
            if marks_cast {
                record.last_cast = Some(turn);
            }
            return Ok(true);
        }

        let stacks = op.amount();
        if stacks == 0 {
            return Ok(false);
        }
        if self.records.is_full() {
            return Err(StatusError::Full(kind));
        }
        self.records.push(StatusEffectRecord {
            kind,
            stacks,
            permanent: rule.flags.contains(StatusFlags::PERMANENT),
            applied_at: turn,
            last_cast: marks_cast.then_some(turn),
        });
        Ok(true)
    }

    /// Current stacks of `kind`, zero when absent.
    pub fn stacks_of(&self, kind: StatusKind) -> u32 {
        self.record(kind).map_or(0, |r| r.stacks)
    }

    /// Returns true if `kind` is present with at least one stack.
    pub fn has(&self, kind: StatusKind) -> bool {
        self.stacks_of(kind) > 0
    }

    pub fn record(&self, kind: StatusKind) -> Option<&StatusEffectRecord> {
        self.records.iter().find(|r| r.kind == kind)
    }

    /// Removes a status effect immediately.
    pub fn remove(&mut self, kind: StatusKind) -> Option<StatusEffectRecord> {
        let index = self.records.iter().position(|r| r.kind == kind)?;
        Some(self.records.remove(index))
    }

    /// Drops every record whose stacks reached zero.
    pub fn prune_zero(&mut self) {
        self.records.retain(|r| r.stacks > 0);
    }

    /// Marks a record as battle-duration. Returns false if `kind` is absent.
    pub fn set_permanent(&mut self, kind: StatusKind, permanent: bool) -> bool {
        match self.records.iter_mut().find(|r| r.kind == kind) {
            Some(record) => {
                record.permanent = permanent;
                true
            }
            None => false,
        }
    }

    /// Whether a trigger-bearing `kind` reacts to an attack on `current` turn.
    ///
    /// An application cast on the current turn does not react yet: the record
    /// must have been cast on a strictly earlier turn.
    pub fn retaliation_active(&self, kind: StatusKind, current: Turn) -> bool {
        match self.record(kind) {
            Some(record) if record.stacks > 0 => {
                record.last_cast.is_none_or(|cast| cast < current)
            }
            _ => false,
        }
    }

    /// Returns true if any present kind carries `flag`.
    pub fn any_with(&self, flag: StatusFlags) -> bool {
        self.records.iter().any(|r| r.kind.has_flag(flag))
    }

    /// Clears every record after the holder died.
    ///
    /// `teardown` is invoked for kinds flagged `TEARDOWN_ON_DEATH`, in record order.
    pub fn clear_on_death(&mut self, owner: CombatantId, teardown: &mut dyn StatusTeardown) {
        for record in self.records.drain(..) {
            if record.kind.has_flag(StatusFlags::TEARDOWN_ON_DEATH) {
                teardown.on_teardown(owner, record.kind);
            }
        }
    }

    /// Removes every record without invoking hooks.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusEffectRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
