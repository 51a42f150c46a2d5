use crate::error::RpcError;
use serde::{Serialize, de::DeserializeOwned};

/// Wire encodings a connection can negotiate.
///
/// The kind decides how header records and typed values are serialized;
/// record framing is the same length-prefixed layout for every kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodecKind {
    /// Compact binary encoding via `bitcode`.
    Bitcode,
    /// Human-readable JSON encoding.
    Json,
}

impl CodecKind {
    /// The tag carried in the connect handshake.
    pub fn tag(&self) -> &'static str {
        match self {
            CodecKind::Bitcode => "application/bitcode",
            CodecKind::Json => "application/json",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "application/bitcode" => Some(CodecKind::Bitcode),
            "application/json" => Some(CodecKind::Json),
            _ => None,
        }
    }

    /// Serializes a value into the bytes of one body record.
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, RpcError> {
        match self {
            CodecKind::Bitcode => {
                bitcode::serialize(value).map_err(|err| RpcError::Encode(err.to_string()))
            }
            CodecKind::Json => {
                serde_json::to_vec(value).map_err(|err| RpcError::Encode(err.to_string()))
            }
        }
    }

    /// Deserializes a value out of the bytes of one body record.
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, RpcError> {
        match self {
            CodecKind::Bitcode => {
                bitcode::deserialize(bytes).map_err(|err| RpcError::Decode(err.to_string()))
            }
            CodecKind::Json => {
                serde_json::from_slice(bytes).map_err(|err| RpcError::Decode(err.to_string()))
            }
        }
    }
}
