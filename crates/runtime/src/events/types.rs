//! Event payloads.

use battle_core::{AbilityId, ReplayStatus, Turn};

/// Something observable happened on one end of the replication channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEvent {
    /// The host resolved a cast and sent its outcome.
    OutcomeEmitted {
        ability: AbilityId,
        timestamp: u64,
        targets: usize,
    },

    /// The host cast found no target; nothing was sent.
    NoTarget { ability: AbilityId, turn: Turn },

    /// The guest applied an outcome.
    OutcomeApplied {
        ability: AbilityId,
        timestamp: u64,
        status: ReplayStatus,
    },

    /// The guest dropped an update it could not decode, route or apply.
    UpdateDropped { event_type: String, error: String },

    /// The guest saw an outcome key it already applied.
    DuplicateIgnored { ability: AbilityId, timestamp: u64 },
}

impl BattleEvent {
    pub fn topic(&self) -> super::Topic {
        match self {
            Self::OutcomeEmitted { .. } | Self::NoTarget { .. } => super::Topic::Host,
            Self::OutcomeApplied { .. }
            | Self::UpdateDropped { .. }
            | Self::DuplicateIgnored { .. } => super::Topic::Guest,
        }
    }
}
