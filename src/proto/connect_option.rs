use crate::codec::CodecKind;
use crate::constants::MAGIC_NUMBER;
use serde::{Deserialize, Serialize};

/// One-shot negotiation record sent by the client before any RPC traffic.
///
/// The record is always JSON-encoded in its own length-prefixed frame,
/// independent of the codec it selects: the receiving side cannot know the
/// codec before reading it. It is never renegotiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectOption {
    /// Identifies the stream as speaking this protocol.
    pub magic: u32,

    /// Codec tag the rest of the connection will use.
    pub codec: String,
}

impl ConnectOption {
    pub fn new(codec: &str) -> Self {
        ConnectOption {
            magic: MAGIC_NUMBER,
            codec: codec.to_string(),
        }
    }
}

impl Default for ConnectOption {
    fn default() -> Self {
        ConnectOption::new(CodecKind::Bitcode.tag())
    }
}
