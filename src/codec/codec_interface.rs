use crate::error::RpcError;
use crate::proto::RpcHeader;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

/// Boxed read half of an ordered, reliable byte stream.
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Boxed write half of an ordered, reliable byte stream.
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Decoding half of a connection's codec.
///
/// A header record and a body record are always read as two separate framed
/// decodes, in that order. Dropping the bytes returned by [`read_body`]
/// discards an unwanted body while leaving the stream aligned on the next
/// header.
///
/// [`read_body`]: CodecReader::read_body
#[async_trait]
pub trait CodecReader: Send {
    async fn read_header(&mut self) -> Result<RpcHeader, RpcError>;

    async fn read_body(&mut self) -> Result<Bytes, RpcError>;
}

/// Encoding half of a connection's codec.
#[async_trait]
pub trait CodecWriter: Send {
    /// Writes a header record and a body record as one flushed unit.
    ///
    /// Callers serialize concurrent writes externally. A failure mid-write
    /// leaves the stream corrupt, so the writer poisons itself and refuses
    /// every later write.
    async fn write(&mut self, header: &RpcHeader, body: &[u8]) -> Result<(), RpcError>;

    /// Flushes and shuts down the underlying transport.
    async fn shutdown(&mut self) -> Result<(), RpcError>;
}
