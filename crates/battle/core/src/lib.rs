//! Deterministic battle rules shared by the host and the guest peer.
//!
//! `battle-core` defines the canonical combat model (combatants, stacking status
//! effects, resistance charges) and the host-authoritative resolution of
//! abilities. The host drives every cast through
//! [`engine::ActionResolutionPipeline`], which produces an [`ActionOutcome`]:
//! the realized result of the cast and the only thing ever replicated. The
//! guest applies outcomes with [`engine::replay_outcome`] and never consumes
//! randomness.
//!
//! Modules are organized by responsibility:
//! - [`state`] holds battle state, combatants and the status effect store
//! - [`action`] defines ability profiles, targeting and the outcome wire types
//! - [`engine`] hosts the pipeline, the resistance ledger and outcome replay
//! - [`env`] declares the external collaborators (RNG, combat log, hooks)
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod state;

pub use action::{
    AbilityId, AbilityProfile, AbilityTable, ActionOutcome, EffectSpec, Eligibility,
    FallbackBands, Formula, Mutation, NeedMetric, OutcomeKey, Scope, StackBonus, StatusRider,
    TargetReport, TargetingRule,
};
pub use config::{BattleConfig, ConfigError};
pub use engine::{
    ActionResolutionPipeline, CastRequest, NoTargetReport, PipelineError, PipelineStage,
    ReplayError, ReplayStatus, Resolution, ResistanceLedger, ResistancePolicy, apply_mutation,
    replay_outcome,
};
pub use env::{
    AbilityOracle, CombatLog, LogSeverity, MemoryCombatLog, NoTeardown, NullCombatLog,
    NoPresentation, PcgRandom, Presentation, RandomSource, RandomSourceExt, RenderAnchor,
    ScriptedRandom, StatusTeardown, VisualCue,
};
pub use error::{BattleError, ErrorSeverity};
pub use state::{
    AbsoluteAddress, AbsoluteSide, BattleState, Combatant, CombatantId, CombatantKind,
    DamageReport, Hero, LocalSide, PersistedStack, ResistanceCharges, Slot, StackOp,
    StackPolicy, StateError, StatusEffectRecord, StatusEffectStore, StatusFlags, StatusKind,
    StatusRule, TargetDescriptor, Trigger, Turn,
};
