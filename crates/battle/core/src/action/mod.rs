//! Ability domain: data-driven profiles, targeting and realized outcomes.
//!
//! - `ability`: [`AbilityId`] and the per-ability [`AbilityProfile`] table
//! - `formula`: table-driven magnitude formulas
//! - `targeting`: targeting rules and the pure target-selection functions
//! - `outcome`: [`ActionOutcome`], the only replicated message, and its mutations
mod ability;
mod formula;
mod outcome;
pub mod targeting;

pub use ability::{AbilityId, AbilityProfile, AbilityTable, EffectSpec, StatusRider};
pub use formula::{Formula, StackBonus};
pub use outcome::{ActionOutcome, Mutation, OutcomeKey, TargetReport};
pub use targeting::{Eligibility, FallbackBands, NeedMetric, Scope, TargetingRule};
