use super::{ByteReader, ByteWriter};
use crate::constants::{FRAME_DRAIN_CHUNK_SIZE, FRAME_LENGTH_FIELD_SIZE, MAX_FRAME_SIZE};
use crate::error::RpcError;
use bytes::Bytes;
use std::io;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Reads length-prefixed records from a byte stream.
///
/// A record is a `u32` little-endian length followed by exactly that many
/// payload bytes.
pub struct FrameReader {
    io: ByteReader,
}

impl FrameReader {
    pub fn new(io: ByteReader) -> Self {
        FrameReader { io }
    }

    /// Returns the underlying stream, e.g. to hand it to a codec
    /// constructor after the handshake record has been read.
    pub fn into_inner(self) -> ByteReader {
        self.io
    }

    /// Reads one record.
    ///
    /// An oversized record is fully drained off the stream before the error
    /// returns, so the next record stays aligned. Every other failure is a
    /// transport error and leaves the stream unusable.
    pub async fn read_frame(&mut self) -> Result<Bytes, RpcError> {
        let mut len_buf = [0u8; FRAME_LENGTH_FIELD_SIZE];
        self.io.read_exact(&mut len_buf).await?;
        let len = u32::from_le_bytes(len_buf) as usize;
        if len > MAX_FRAME_SIZE {
            self.drain(len).await?;
            return Err(RpcError::FrameTooLarge { len });
        }
        let mut buf = vec![0u8; len];
        self.io.read_exact(&mut buf).await?;
        Ok(Bytes::from(buf))
    }

    async fn drain(&mut self, mut remaining: usize) -> Result<(), RpcError> {
        let mut scratch = [0u8; FRAME_DRAIN_CHUNK_SIZE];
        while remaining > 0 {
            let take = remaining.min(scratch.len());
            self.io.read_exact(&mut scratch[..take]).await?;
            remaining -= take;
        }
        Ok(())
    }
}

/// Writes length-prefixed records to a byte stream.
pub struct FrameWriter {
    io: ByteWriter,
    poisoned: bool,
}

impl FrameWriter {
    pub fn new(io: ByteWriter) -> Self {
        FrameWriter {
            io,
            poisoned: false,
        }
    }

    pub fn into_inner(self) -> ByteWriter {
        self.io
    }

    /// Appends one record to `buf` without touching the transport.
    pub fn encode_into(buf: &mut Vec<u8>, record: &[u8]) {
        buf.extend_from_slice(&(record.len() as u32).to_le_bytes());
        buf.extend_from_slice(record);
    }

    /// Writes one record on its own. Used for the handshake, which precedes
    /// any codec.
    pub async fn write_frame(&mut self, record: &[u8]) -> Result<(), RpcError> {
        let mut buf = Vec::with_capacity(FRAME_LENGTH_FIELD_SIZE + record.len());
        Self::encode_into(&mut buf, record);
        self.write_assembled(&buf).await
    }

    /// Writes a pre-assembled run of records as one flushed unit.
    ///
    /// A failure anywhere leaves the peer unable to re-align, so the writer
    /// poisons itself and shuts the transport down.
    pub async fn write_assembled(&mut self, buf: &[u8]) -> Result<(), RpcError> {
        if self.poisoned {
            return Err(RpcError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "stream poisoned by an earlier write failure",
            )));
        }
        if let Err(err) = self.write_inner(buf).await {
            self.poisoned = true;
            let _ = self.io.shutdown().await;
            return Err(RpcError::Io(err));
        }
        Ok(())
    }

    async fn write_inner(&mut self, buf: &[u8]) -> io::Result<()> {
        self.io.write_all(buf).await?;
        self.io.flush().await
    }

    pub async fn shutdown(&mut self) -> Result<(), RpcError> {
        self.io.shutdown().await?;
        Ok(())
    }
}
