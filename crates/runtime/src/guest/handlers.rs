//! Outcome handlers keyed by event type.

use std::collections::HashMap;
use std::sync::Arc;

use battle_core::{
    AbilityId, ActionOutcome, BattleState, ReplayError, ReplayStatus, StatusTeardown,
    replay_outcome,
};
use strum::IntoEnumIterator;

/// Applies one decoded outcome on the guest.
///
/// Handlers must not consult randomness or re-run targeting; every
/// game-state change comes from the transmitted mutations.
pub trait OutcomeHandler: Send + Sync {
    /// Returns a human-readable name for this handler (used in logging).
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        state: &mut BattleState,
        outcome: &ActionOutcome,
        teardown: &mut dyn StatusTeardown,
    ) -> Result<ReplayStatus, ReplayError>;
}

/// Applies the transmitted mutations as they are.
#[derive(Clone, Copy, Debug, Default)]
pub struct GenericReplayHandler;

impl OutcomeHandler for GenericReplayHandler {
    fn name(&self) -> &'static str {
        "generic_replay"
    }

    fn apply(
        &self,
        state: &mut BattleState,
        outcome: &ActionOutcome,
        teardown: &mut dyn StatusTeardown,
    ) -> Result<ReplayStatus, ReplayError> {
        replay_outcome(state, outcome, teardown)
    }
}

/// Routes event types to their handlers.
#[derive(Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<&'static str, Arc<dyn OutcomeHandler>>,
}

impl HandlerRegistry {
    /// A registry that knows no event type.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers [`GenericReplayHandler`] for every ability.
    pub fn with_defaults() -> Self {
        let generic: Arc<dyn OutcomeHandler> = Arc::new(GenericReplayHandler);
        let handlers = AbilityId::iter()
            .map(|ability| (ability.event_type(), Arc::clone(&generic)))
            .collect();
        Self { handlers }
    }

    /// Installs `handler` for `ability`, returning the one it replaces.
    pub fn register(
        &mut self,
        ability: AbilityId,
        handler: impl OutcomeHandler + 'static,
    ) -> Option<Arc<dyn OutcomeHandler>> {
        self.handlers.insert(ability.event_type(), Arc::new(handler))
    }

    pub fn find(&self, event_type: &str) -> Option<Arc<dyn OutcomeHandler>> {
        self.handlers.get(event_type).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_ability() {
        let registry = HandlerRegistry::with_defaults();
        assert_eq!(registry.len(), AbilityId::iter().count());
        for ability in AbilityId::iter() {
            let handler = registry
                .find(ability.event_type())
                .expect("every ability should have a handler");
            assert_eq!(handler.name(), "generic_replay");
        }
        assert!(registry.find("teleport").is_none());
        assert!(HandlerRegistry::empty().is_empty());
    }
}
