use std::fmt;
use std::io;

/// Errors surfaced by clients, servers, and codecs.
#[derive(Debug)]
pub enum RpcError {
    /// The client was closed locally, or a transport failure shut it down.
    Shutdown,

    /// A transport-level I/O failure.
    Io(io::Error),

    /// A value could not be serialized for the wire.
    Encode(String),

    /// A wire record could not be deserialized.
    Decode(String),

    /// A framed record declared a length beyond the configured bound. The
    /// record has been fully drained, so the stream is still aligned.
    FrameTooLarge { len: usize },

    /// The remote handler reported an application error for this call.
    Remote(String),

    /// The handshake carried an unexpected magic number.
    BadMagic(u32),

    /// The handshake requested a codec tag with no registered constructor.
    UnknownCodec(String),

    /// The connection died while the call was in flight.
    ConnectionLost(String),
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Shutdown => write!(f, "connection is shut down"),
            RpcError::Io(err) => write!(f, "I/O error: {}", err),
            RpcError::Encode(msg) => write!(f, "encode error: {}", msg),
            RpcError::Decode(msg) => write!(f, "decode error: {}", msg),
            RpcError::FrameTooLarge { len } => {
                write!(f, "framed record of {} bytes exceeds the size limit", len)
            }
            RpcError::Remote(msg) => write!(f, "remote error: {}", msg),
            RpcError::BadMagic(magic) => write!(f, "unexpected magic number {:#x}", magic),
            RpcError::UnknownCodec(tag) => write!(f, "unknown codec type {}", tag),
            RpcError::ConnectionLost(msg) => write!(f, "connection lost: {}", msg),
        }
    }
}

impl std::error::Error for RpcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RpcError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for RpcError {
    fn from(err: io::Error) -> Self {
        RpcError::Io(err)
    }
}
