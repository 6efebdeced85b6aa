//! Error types for action resolution and outcome replay.

use std::fmt;

use crate::action::AbilityId;
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{CombatantId, StateError, StatusError};

/// Stage of the resolution state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PipelineStage {
    Idle,
    TargetsResolved,
    ResistanceChecked,
    MagnitudeComputed,
    StacksApplied,
    OutcomeEmitted,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::TargetsResolved => "targets_resolved",
            Self::ResistanceChecked => "resistance_checked",
            Self::MagnitudeComputed => "magnitude_computed",
            Self::StacksApplied => "stacks_applied",
            Self::OutcomeEmitted => "outcome_emitted",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while applying a realized mutation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Status(#[from] StatusError),
}

impl BattleError for ReplayError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::State(StateError::MalformedDescriptor(_) | StateError::MissingTarget(_)) => {
                ErrorSeverity::Validation
            }
            Self::State(_) | Self::Status(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::State(inner) => inner.error_code(),
            Self::Status(_) => "REPLAY_STATUS_FULL",
        }
    }
}

/// Errors surfaced by [`super::ActionResolutionPipeline::resolve`].
///
/// An empty target set is not an error; see [`super::Resolution::NoTarget`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("caster {0} is not part of this battle")]
    CasterNotFound(CombatantId),

    #[error("caster {0} is dead")]
    CasterDead(CombatantId),

    #[error("no profile for ability {0:?}")]
    AbilityNotFound(AbilityId),

    #[error("caster {caster} has not learned {ability:?}")]
    AbilityNotLearned {
        caster: CombatantId,
        ability: AbilityId,
    },

    #[error(transparent)]
    State(#[from] StateError),

    #[error("{stage} failed: {source}")]
    Mutation {
        stage: PipelineStage,
        source: ReplayError,
    },
}

impl BattleError for PipelineError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CasterDead(_) | Self::AbilityNotLearned { .. } => ErrorSeverity::Recoverable,
            Self::CasterNotFound(_) => ErrorSeverity::Validation,
            Self::AbilityNotFound(_) => ErrorSeverity::Internal,
            Self::State(inner) => inner.severity(),
            Self::Mutation { source, .. } => source.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CasterNotFound(_) => "PIPELINE_CASTER_NOT_FOUND",
            Self::CasterDead(_) => "PIPELINE_CASTER_DEAD",
            Self::AbilityNotFound(_) => "PIPELINE_ABILITY_NOT_FOUND",
            Self::AbilityNotLearned { .. } => "PIPELINE_ABILITY_NOT_LEARNED",
            Self::State(inner) => inner.error_code(),
            Self::Mutation { source, .. } => source.error_code(),
        }
    }
}
