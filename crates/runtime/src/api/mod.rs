//! Public API surface of the replication runtime.
mod errors;

pub use errors::{CodecError, HostError, ReplicationError, Result, TransportError};
