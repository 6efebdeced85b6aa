//! Host/guest replication for battle outcomes.
//!
//! This crate wires the deterministic rules of `battle-core` to a transport.
//! The host resolves casts through [`HostSession`] and ships every realized
//! outcome with [`HostPublisher`]; the guest applies them with
//! [`GuestReplicator`] without ever touching randomness or targeting.
//!
//! Modules are organized by responsibility:
//! - [`api`] exposes the error types downstream clients interact with
//! - [`codec`] and [`transport`] move outcomes over the wire
//! - [`host`] and [`guest`] hold the two ends of the replication channel
//! - [`events`] provides a topic-based event bus for observers
//! - [`presentation`] adapts the core collaborator traits to `tracing`
pub mod api;
pub mod codec;
pub mod config;
pub mod events;
pub mod guest;
pub mod host;
pub mod presentation;
pub mod transport;

pub use api::{CodecError, HostError, ReplicationError, Result, TransportError};
pub use codec::WireFormat;
pub use config::ReplicationConfig;
pub use events::{BattleEvent, EventBus, Topic};
pub use guest::{
    DedupeWindow, GenericReplayHandler, GuestReplicator, HandlerRegistry, OutcomeHandler,
    ReplaySummary,
};
pub use host::{HostPublisher, HostSession};
pub use presentation::{TracingCombatLog, TracingTeardown, narrate, present};
pub use transport::{
    BattleUpdate, MemoryReceiver, MemorySender, Transport, UpdateSource, memory_pair,
};
