//! Topic-based event bus for replication events.
//!
//! Observers (the simulator, tests, a UI) subscribe to the topics they need.
//! Publishing is best-effort and never affects battle state.

mod bus;
mod types;

pub use bus::{EventBus, Topic};
pub use types::BattleEvent;
