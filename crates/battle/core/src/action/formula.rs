//! Magnitude formulas.
//!
//! Every ability scales linearly with its level, optionally plus a bonus per
//! stack of some status on the caster or the target:
//!
//! ```text
//! base + per_level × level + self_bonus × caster_stacks + target_bonus × target_stacks
//! ```
//!
//! Results are clamped at zero.

use crate::state::{Combatant, StatusKind};

/// Bonus per stack of `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StackBonus {
    pub kind: StatusKind,
    pub per_stack: i64,
}

/// Linear magnitude formula of one ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Formula {
    pub base: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub per_level: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub self_stack_bonus: Option<StackBonus>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target_stack_bonus: Option<StackBonus>,
}

impl Formula {
    pub const fn flat(base: i64) -> Self {
        Self {
            base,
            per_level: 0,
            self_stack_bonus: None,
            target_stack_bonus: None,
        }
    }

    pub const fn linear(base: i64, per_level: i64) -> Self {
        Self {
            base,
            per_level,
            self_stack_bonus: None,
            target_stack_bonus: None,
        }
    }

    pub const fn with_self_stacks(mut self, kind: StatusKind, per_stack: i64) -> Self {
        self.self_stack_bonus = Some(StackBonus { kind, per_stack });
        self
    }

    pub const fn with_target_stacks(mut self, kind: StatusKind, per_stack: i64) -> Self {
        self.target_stack_bonus = Some(StackBonus { kind, per_stack });
        self
    }

    /// Evaluates the formula for a caster acting on a target.
    pub fn evaluate(&self, level: u32, caster: &Combatant, target: &Combatant) -> u32 {
        let mut value = self
            .base
            .saturating_add(self.per_level.saturating_mul(i64::from(level)));

        if let Some(bonus) = self.self_stack_bonus {
            let stacks = i64::from(caster.status.stacks_of(bonus.kind));
            value = value.saturating_add(bonus.per_stack.saturating_mul(stacks));
        }
        if let Some(bonus) = self.target_stack_bonus {
            let stacks = i64::from(target.status.stacks_of(bonus.kind));
            value = value.saturating_add(bonus.per_stack.saturating_mul(stacks));
        }

        u32::try_from(value.max(0)).unwrap_or(u32::MAX)
    }
}
