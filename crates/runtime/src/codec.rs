//! Wire codec for replicated outcomes.
use std::fmt;
use std::str::FromStr;

use battle_core::ActionOutcome;

use crate::api::CodecError;

/// Payload encoding used on the wire. Both peers must agree on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WireFormat {
    #[default]
    Json,
    Bincode,
}

impl WireFormat {
    pub fn encode(self, outcome: &ActionOutcome) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => serde_json::to_vec(outcome).map_err(CodecError::Json),
            Self::Bincode => bincode::serialize(outcome).map_err(CodecError::Bincode),
        }
    }

    pub fn decode(self, payload: &[u8]) -> Result<ActionOutcome, CodecError> {
        match self {
            Self::Json => serde_json::from_slice(payload).map_err(CodecError::Json),
            Self::Bincode => bincode::deserialize(payload).map_err(CodecError::Bincode),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Bincode => "bincode",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bincode" | "binary" => Ok(Self::Bincode),
            other => Err(format!("unknown wire format `{other}`")),
        }
    }
}
