//! Host end of the replication channel.
//!
//! The host is the only peer that resolves casts. [`HostSession`] owns the
//! authoritative battle state and the random source, runs each cast through
//! the pipeline and hands the realized outcome to [`HostPublisher`].

use battle_core::{
    AbilityOracle, ActionOutcome, ActionResolutionPipeline, BattleConfig, BattleError,
    BattleState, CastRequest, CombatLog, LogSeverity, NoPresentation, PcgRandom, PersistedStack,
    Presentation, ResistanceLedger, Resolution, StatusTeardown,
};
use tracing::{debug, warn};

use crate::api::{HostError, Result};
use crate::codec::WireFormat;
use crate::events::{BattleEvent, EventBus};
use crate::presentation::{TracingCombatLog, TracingTeardown, narrate, present};
use crate::transport::{BattleUpdate, Transport};

/// Encodes outcomes and sends them to the guest.
pub struct HostPublisher<T> {
    transport: T,
    format: WireFormat,
    bus: EventBus,
}

impl<T: Transport> HostPublisher<T> {
    pub fn new(transport: T, format: WireFormat, bus: EventBus) -> Self {
        Self {
            transport,
            format,
            bus,
        }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Sends one outcome. Outcomes must be published in the order they were
    /// resolved; the guest applies them in delivery order.
    pub async fn publish(&self, outcome: &ActionOutcome) -> Result<()> {
        let payload = self.format.encode(outcome)?;
        let bytes = payload.len();
        self.transport
            .send_battle_update(BattleUpdate::new(outcome.event_type(), payload))
            .await?;

        debug!(
            event_type = outcome.event_type(),
            timestamp = outcome.timestamp,
            bytes,
            "outcome published"
        );
        self.bus.publish(BattleEvent::OutcomeEmitted {
            ability: outcome.ability,
            timestamp: outcome.timestamp,
            targets: outcome.targets.len(),
        });
        Ok(())
    }
}

/// Authoritative battle on the host.
pub struct HostSession<T> {
    state: BattleState,
    rng: PcgRandom,
    abilities: Box<dyn AbilityOracle>,
    ledger: ResistanceLedger,
    config: BattleConfig,
    publisher: HostPublisher<T>,
    log: Box<dyn CombatLog + Send>,
    teardown: Box<dyn StatusTeardown + Send>,
    presentation: Box<dyn Presentation + Send>,
    bus: EventBus,
}

impl<T: Transport> HostSession<T> {
    /// Starts a session. Without a configured seed a fresh one is drawn.
    pub fn new(
        state: BattleState,
        abilities: impl AbilityOracle + 'static,
        config: BattleConfig,
        publisher: HostPublisher<T>,
    ) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(battle_id = state.battle_id, seed, "host session started");
        let bus = publisher.bus.clone();

        Self {
            rng: PcgRandom::for_battle(seed, state.battle_id),
            state,
            abilities: Box::new(abilities),
            ledger: ResistanceLedger::default(),
            config,
            publisher,
            log: Box::new(TracingCombatLog),
            teardown: Box::new(TracingTeardown::default()),
            presentation: Box::new(NoPresentation),
            bus,
        }
    }

    pub fn with_ledger(mut self, ledger: ResistanceLedger) -> Self {
        self.ledger = ledger;
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

    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn convergence_root(&self) -> [u8; 32] {
        self.state.convergence_root()
    }

    pub fn advance_turn(&mut self) -> battle_core::Turn {
        self.state.advance_turn()
    }

    /// Resolves one cast and replicates its outcome.
    ///
    /// A cast without targets is logged locally and never sent.
    pub async fn cast(&mut self, request: CastRequest) -> std::result::Result<Resolution, HostError> {
        let resolved = ActionResolutionPipeline::new(
            &mut self.state,
            &mut self.rng,
            self.abilities.as_ref(),
            &self.ledger,
            &self.config,
        )
        .with_teardown(&mut *self.teardown)
        .resolve(request);

        let resolution = match resolved {
            Ok(resolution) => resolution,
            Err(err) => {
                warn!(
                    caster = %request.caster,
                    ability = request.ability.event_type(),
                    code = err.error_code(),
                    error = %err,
                    "cast rejected"
                );
                return Err(err.into());
            }
        };

        match &resolution {
            Resolution::Emitted(outcome) => {
                for line in narrate(&self.state, outcome) {
                    self.log.add(&line, LogSeverity::Info);
                }
                present(&mut *self.presentation, &mut *self.log, outcome);
                self.publisher.publish(outcome).await?;
            }
            Resolution::NoTarget(report) => {
                debug!(
                    ability = report.ability.event_type(),
                    caster = %report.caster,
                    turn = %report.turn,
                    "cast found no target"
                );
                self.log.add(
                    &format!("{} finds no target", report.ability.event_type()),
                    LogSeverity::Info,
                );
                self.bus.publish(BattleEvent::NoTarget {
                    ability: report.ability,
                    turn: report.turn,
                });
            }
        }
        Ok(resolution)
    }

    /// Ends the battle, returning the permanent stacks to persist.
    pub fn finish(&mut self) -> Vec<PersistedStack> {
        let saved = self.state.persisted_stacks();
        self.state.end_battle();
        saved
    }
}
