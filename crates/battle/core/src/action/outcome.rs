//! Realized action outcomes: the only data replicated between peers.
//!
//! An [`ActionOutcome`] carries no seed and no decision trace. Its
//! [`Mutation`] list records every state change the host made, in order, with
//! realized values, so the guest can reproduce the host's state without
//! re-deriving anything.

use crate::action::AbilityId;
use crate::state::{AbsoluteAddress, AbsoluteSide, StackOp, StatusKind, TargetDescriptor, Turn};

/// One realized state change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Damage split into the shield-absorbed and HP-lost parts.
    Damage {
        target: TargetDescriptor,
        shield_absorbed: u32,
        hp_lost: u32,
    },
    Heal {
        target: TargetDescriptor,
        amount: u32,
    },
    GrantShield {
        target: TargetDescriptor,
        amount: u32,
    },
    /// Stack change with the op the host's policy produced.
    ApplyStacks {
        target: TargetDescriptor,
        kind: StatusKind,
        op: StackOp,
        turn: Turn,
    },
    RemoveStatus {
        target: TargetDescriptor,
        kind: StatusKind,
    },
    ConsumeResistance {
        target: TargetDescriptor,
    },
    GrantResistance {
        target: TargetDescriptor,
        charges: u32,
    },
}

impl Mutation {
    pub fn target(&self) -> &TargetDescriptor {
        match self {
            Self::Damage { target, .. }
            | Self::Heal { target, .. }
            | Self::GrantShield { target, .. }
            | Self::ApplyStacks { target, .. }
            | Self::RemoveStatus { target, .. }
            | Self::ConsumeResistance { target }
            | Self::GrantResistance { target, .. } => target,
        }
    }

    fn target_mut(&mut self) -> &mut TargetDescriptor {
        match self {
            Self::Damage { target, .. }
            | Self::Heal { target, .. }
            | Self::GrantShield { target, .. }
            | Self::ApplyStacks { target, .. }
            | Self::RemoveStatus { target, .. }
            | Self::ConsumeResistance { target }
            | Self::GrantResistance { target, .. } => target,
        }
    }
}

/// Per-target summary of what the cast did, for logs and visuals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TargetReport {
    pub target: TargetDescriptor,
    /// A resistance charge negated the cast on this target.
    pub resisted: bool,
    /// A redirect negated the attack and punished the caster.
    pub redirected: bool,
    /// Healing was skipped because the target is heal-blocked.
    pub heal_blocked: bool,
    /// Total damage dealt, shield included.
    pub damage: u32,
    pub healed: u32,
    pub shield: u32,
    /// Stacks applied to the target by the effect and its rider.
    pub stacks: u32,
    /// Reactive damage dealt back to the caster.
    pub retaliation: u32,
    /// The target died from this cast.
    pub died: bool,
}

impl TargetReport {
    pub fn new(target: TargetDescriptor) -> Self {
        Self {
            target,
            resisted: false,
            redirected: false,
            heal_blocked: false,
            damage: 0,
            healed: 0,
            shield: 0,
            stacks: 0,
            retaliation: 0,
            died: false,
        }
    }

    /// Whether the effect reached the target.
    pub fn landed(&self) -> bool {
        !self.resisted && !self.redirected && !self.heal_blocked
    }
}

/// Idempotency key of an outcome: timestamp, caster and target tuple.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutcomeKey {
    pub timestamp: u64,
    pub caster: AbsoluteAddress,
    pub targets: Vec<AbsoluteAddress>,
}

/// Realized result of one cast.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionOutcome {
    pub ability: AbilityId,
    pub caster: TargetDescriptor,
    pub targets: Vec<TargetDescriptor>,
    pub reports: Vec<TargetReport>,
    /// Every state change, in application order.
    pub mutations: Vec<Mutation>,
    /// Turn the cast happened on.
    pub turn: Turn,
    /// Monotonic per battle; issued by the host.
    pub timestamp: u64,
}

impl ActionOutcome {
    pub fn event_type(&self) -> &'static str {
        self.ability.event_type()
    }

    /// Re-frames every descriptor for a peer that owns `me`.
    pub fn localized(mut self, me: AbsoluteSide) -> Self {
        self.caster = self.caster.localize(me);
        for target in &mut self.targets {
            *target = target.localize(me);
        }
        for report in &mut self.reports {
            report.target = report.target.localize(me);
        }
        for mutation in &mut self.mutations {
            let target = mutation.target_mut();
            *target = target.localize(me);
        }
        self
    }

    pub fn key(&self) -> OutcomeKey {
        OutcomeKey {
            timestamp: self.timestamp,
            caster: self.caster.address(),
            targets: self.targets.iter().map(TargetDescriptor::address).collect(),
        }
    }

    /// Every descriptor the outcome refers to.
    pub fn descriptors(&self) -> impl Iterator<Item = &TargetDescriptor> {
        std::iter::once(&self.caster)
            .chain(self.targets.iter())
            .chain(self.reports.iter().map(|r| &r.target))
            .chain(self.mutations.iter().map(Mutation::target))
    }
}
