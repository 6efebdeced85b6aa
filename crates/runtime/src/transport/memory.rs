//! In-memory transport over a bounded tokio channel.
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{BattleUpdate, Transport, UpdateSource};
use crate::api::TransportError;

/// Host end of an in-memory transport. Cloning shares the channel.
#[derive(Clone, Debug)]
pub struct MemorySender {
    tx: mpsc::Sender<BattleUpdate>,
}

/// Guest end of an in-memory transport.
#[derive(Debug)]
pub struct MemoryReceiver {
    rx: mpsc::Receiver<BattleUpdate>,
}

/// Creates a connected sender/receiver pair holding up to `capacity` updates.
pub fn memory_pair(capacity: usize) -> (MemorySender, MemoryReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MemorySender { tx }, MemoryReceiver { rx })
}

#[async_trait]
impl Transport for MemorySender {
    async fn send_battle_update(&self, update: BattleUpdate) -> Result<(), TransportError> {
        self.tx
            .send(update)
            .await
            .map_err(|_| TransportError::Closed)
    }
}

#[async_trait]
impl UpdateSource for MemoryReceiver {
    async fn next_update(&mut self) -> Option<BattleUpdate> {
        self.rx.recv().await
    }
}
