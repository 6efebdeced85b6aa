//! Unified error types surfaced by the replication API.
//!
//! Guest-side failures drop the offending update and leave the session
//! running; callers decide whether to log or abort.
use battle_core::{BattleError, ErrorSeverity, PipelineError, ReplayError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReplicationError>;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json codec failed")]
    Json(#[source] serde_json::Error),

    #[error("bincode codec failed")]
    Bincode(#[source] bincode::Error),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("peer channel closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error("no handler registered for event type `{0}`")]
    UnknownEventType(String),

    #[error("event type `{event_type}` does not match payload ability `{ability}`")]
    EventTypeMismatch {
        event_type: String,
        ability: &'static str,
    },

    #[error("malformed payload")]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("outcome could not be applied")]
    Replay(#[from] ReplayError),
}

impl BattleError for ReplicationError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownEventType(_) | Self::EventTypeMismatch { .. } | Self::Codec(_) => {
                ErrorSeverity::Validation
            }
            Self::Transport(_) => ErrorSeverity::Recoverable,
            Self::Replay(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEventType(_) => "REPLICATION_UNKNOWN_EVENT_TYPE",
            Self::EventTypeMismatch { .. } => "REPLICATION_EVENT_TYPE_MISMATCH",
            Self::Codec(_) => "REPLICATION_MALFORMED_PAYLOAD",
            Self::Transport(_) => "REPLICATION_TRANSPORT",
            Self::Replay(inner) => inner.error_code(),
        }
    }
}

/// Failure of a host-side cast.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Replication(#[from] ReplicationError),
}

impl BattleError for HostError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Pipeline(inner) => inner.severity(),
            Self::Replication(inner) => inner.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Pipeline(inner) => inner.error_code(),
            Self::Replication(inner) => inner.error_code(),
        }
    }
}
