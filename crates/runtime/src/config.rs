//! Replication runtime configuration.
use std::env;

use crate::codec::WireFormat;

/// Settings shared by the host publisher and the guest replicator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplicationConfig {
    pub wire_format: WireFormat,
    /// Capacity of the in-memory transport channel.
    pub channel_capacity: usize,
    /// How many recent outcome keys the guest remembers for duplicate detection.
    pub dedupe_window: usize,
    /// Capacity of each event bus topic.
    pub event_buffer_size: usize,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            wire_format: WireFormat::Json,
            channel_capacity: 64,
            dedupe_window: 256,
            event_buffer_size: 100,
        }
    }
}

impl ReplicationConfig {
    /// Defaults overridden by `BATTLE_WIRE_FORMAT`, `BATTLE_CHANNEL_CAPACITY`
    /// and `BATTLE_DEDUPE_WINDOW`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(format) = read_env::<WireFormat>("BATTLE_WIRE_FORMAT") {
            config.wire_format = format;
        }
        if let Some(capacity) = read_env::<usize>("BATTLE_CHANNEL_CAPACITY") {
            config.channel_capacity = capacity.max(1);
        }
        if let Some(window) = read_env::<usize>("BATTLE_DEDUPE_WINDOW") {
            config.dedupe_window = window.max(1);
        }

        config
    }

    pub fn with_wire_format(mut self, wire_format: WireFormat) -> Self {
        self.wire_format = wire_format;
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}
