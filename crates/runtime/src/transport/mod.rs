//! Transport seam between the host and the guest.
//!
//! The concrete network is out of scope; [`memory_pair`] provides a reliable,
//! ordered in-process channel for tests and the simulator.
mod memory;

pub use memory::{MemoryReceiver, MemorySender, memory_pair};

use async_trait::async_trait;

use crate::api::TransportError;

/// One replicated event: the ability's event type plus the encoded outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleUpdate {
    pub event_type: String,
    pub payload: Vec<u8>,
}

impl BattleUpdate {
    pub fn new(event_type: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }
}

/// Sending half, owned by the host.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_battle_update(&self, update: BattleUpdate) -> Result<(), TransportError>;
}

/// Receiving half, drained by the guest in delivery order.
#[async_trait]
pub trait UpdateSource: Send {
    /// Returns `None` once the host side is gone.
    async fn next_update(&mut self) -> Option<BattleUpdate>;
}
