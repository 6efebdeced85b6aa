//! Collaborators the battle rules depend on but do not own.
//!
//! The pipeline reaches the outside world only through these traits: a random
//! source, the ability catalogue, a combat log, teardown hooks for effects with
//! bespoke cleanup, and a presentation layer the runtime drives after a cast.
mod hooks;
mod rng;

pub use hooks::{
    CombatLog, LogSeverity, MemoryCombatLog, NoPresentation, NoTeardown, NullCombatLog,
    Presentation, RenderAnchor, StatusTeardown, VisualCue,
};
pub use rng::{PcgRandom, RandomSource, RandomSourceExt, ScriptedRandom, compute_seed};

use crate::action::{AbilityId, AbilityProfile};

/// Oracle providing ability profiles.
///
/// Profiles are data: targeting rule, effect, magnitude formula and status
/// riders. They are loaded from RON by the content crate.
pub trait AbilityOracle: Send + Sync {
    /// Profile of `id`, or `None` if the catalogue does not define it.
    fn profile(&self, id: AbilityId) -> Option<&AbilityProfile>;
}
