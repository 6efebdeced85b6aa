//! Guest end of the replication channel.
//!
//! The guest never resolves anything. Each [`BattleUpdate`] is decoded,
//! routed to the handler for its event type, checked against recently applied
//! outcome keys and applied from its transmitted mutations. A bad update is
//! dropped and reported; the session carries on with the next one.

mod dedupe;
mod handlers;

pub use dedupe::DedupeWindow;
pub use handlers::{GenericReplayHandler, HandlerRegistry, OutcomeHandler};

use battle_core::{
    BattleError, BattleState, CombatLog, LogSeverity, NoPresentation, Presentation, ReplayStatus,
    StatusTeardown,
};
use tracing::{debug, error};

use crate::api::{ReplicationError, Result};
use crate::config::ReplicationConfig;
use crate::events::{BattleEvent, EventBus};
use crate::presentation::{TracingCombatLog, TracingTeardown, narrate, present};
use crate::transport::{BattleUpdate, UpdateSource};

/// Counts from one [`GuestReplicator::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub applied: usize,
    pub duplicates: usize,
    pub dropped: usize,
}

/// Mirror of the host's battle, driven only by received outcomes.
pub struct GuestReplicator {
    state: BattleState,
    config: ReplicationConfig,
    handlers: HandlerRegistry,
    dedupe: DedupeWindow,
    log: Box<dyn CombatLog + Send>,
    teardown: Box<dyn StatusTeardown + Send>,
    presentation: Box<dyn Presentation + Send>,
    bus: EventBus,
}

impl GuestReplicator {
    pub fn new(state: BattleState, config: ReplicationConfig, bus: EventBus) -> Self {
        Self {
            state,
            dedupe: DedupeWindow::new(config.dedupe_window),
            config,
            handlers: HandlerRegistry::with_defaults(),
            log: Box::new(TracingCombatLog),
            teardown: Box::new(TracingTeardown::default()),
            presentation: Box::new(NoPresentation),
            bus,
        }
    }

    pub fn with_handlers(mut self, handlers: HandlerRegistry) -> Self {
        self.handlers = handlers;
        self
    }

    pub fn with_combat_log(mut self, log: impl CombatLog + Send + 'static) -> Self {
        self.log = Box::new(log);
        self
    }

    pub fn with_teardown(mut self, teardown: impl StatusTeardown + Send + 'static) -> Self {
        self.teardown = Box::new(teardown);
        self
    }

    pub fn with_presentation(mut self, presentation: impl Presentation + Send + 'static) -> Self {
        self.presentation = Box::new(presentation);
        self
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Mutable access for turn bookkeeping and save/resume; never for outcomes.
    pub fn state_mut(&mut self) -> &mut BattleState {
        &mut self.state
    }

    pub fn handlers_mut(&mut self) -> &mut HandlerRegistry {
        &mut self.handlers
    }

    pub fn convergence_root(&self) -> [u8; 32] {
        self.state.convergence_root()
    }

    /// Handles one received update.
    ///
    /// On error nothing was applied, the update is dropped and the error is
    /// logged before it is returned.
    pub fn on_battle_update(&mut self, event_type: &str, payload: &[u8]) -> Result<ReplayStatus> {
        match self.apply_update(event_type, payload) {
            Ok(status) => Ok(status),
            Err(err) => {
                error!(
                    event_type,
                    code = err.error_code(),
                    error = %err,
                    "dropping battle update"
                );
                self.log.add(
                    &format!("dropped `{event_type}` update: {err}"),
                    LogSeverity::Error,
                );
                self.bus.publish(BattleEvent::UpdateDropped {
                    event_type: event_type.to_owned(),
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Drains `source` in delivery order until the host side closes.
    pub async fn run(&mut self, source: &mut impl UpdateSource) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        while let Some(BattleUpdate {
            event_type,
            payload,
        }) = source.next_update().await
        {
            match self.on_battle_update(&event_type, &payload) {
                Ok(ReplayStatus::Applied) => summary.applied += 1,
                Ok(ReplayStatus::AlreadyApplied) => summary.duplicates += 1,
                Err(_) => summary.dropped += 1,
            }
        }
        debug!(
            applied = summary.applied,
            duplicates = summary.duplicates,
            dropped = summary.dropped,
            "update source closed"
        );
        summary
    }

    fn apply_update(&mut self, event_type: &str, payload: &[u8]) -> Result<ReplayStatus> {
        let handler = self
            .handlers
            .find(event_type)
            .ok_or_else(|| ReplicationError::UnknownEventType(event_type.to_owned()))?;
        let outcome = self.config.wire_format.decode(payload)?;
        if outcome.event_type() != event_type {
            return Err(ReplicationError::EventTypeMismatch {
                event_type: event_type.to_owned(),
                ability: outcome.event_type(),
            });
        }

        let key = outcome.key();
        if self.dedupe.contains(&key) {
            debug!(event_type, timestamp = outcome.timestamp, "duplicate outcome ignored");
            self.bus.publish(BattleEvent::DuplicateIgnored {
                ability: outcome.ability,
                timestamp: outcome.timestamp,
            });
            return Ok(ReplayStatus::AlreadyApplied);
        }

        let status = handler.apply(&mut self.state, &outcome, &mut *self.teardown)?;
        match status {
            ReplayStatus::Applied => {
                self.dedupe.insert(key);
                let local = outcome.clone().localized(self.state.me());
                for line in narrate(&self.state, &local) {
                    self.log.add(&line, LogSeverity::Info);
                }
                present(&mut *self.presentation, &mut *self.log, &local);
            }
            ReplayStatus::AlreadyApplied => {
                debug!(
                    event_type,
                    handler = handler.name(),
                    timestamp = outcome.timestamp,
                    "outcome older than the guest clock ignored"
                );
            }
        }

        self.bus.publish(BattleEvent::OutcomeApplied {
            ability: outcome.ability,
            timestamp: outcome.timestamp,
            status,
        });
        Ok(status)
    }
}
