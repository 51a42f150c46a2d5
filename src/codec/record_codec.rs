use super::{ByteReader, ByteWriter, CodecKind, CodecReader, CodecWriter, FrameReader, FrameWriter};
use crate::constants::FRAME_LENGTH_FIELD_SIZE;
use crate::error::RpcError;
use crate::proto::RpcHeader;
use async_trait::async_trait;
use bytes::Bytes;

/// [`CodecReader`] shared by every built-in encoding: records are
/// length-prefixed, and `kind` decides how the header record deserializes.
pub struct RecordReader {
    kind: CodecKind,
    frames: FrameReader,
}

impl RecordReader {
    pub fn new(kind: CodecKind, io: ByteReader) -> Self {
        RecordReader {
            kind,
            frames: FrameReader::new(io),
        }
    }
}

#[async_trait]
impl CodecReader for RecordReader {
    async fn read_header(&mut self) -> Result<RpcHeader, RpcError> {
        let frame = self.frames.read_frame().await?;
        self.kind.decode(&frame)
    }

    async fn read_body(&mut self) -> Result<Bytes, RpcError> {
        self.frames.read_frame().await
    }
}

/// [`CodecWriter`] counterpart of [`RecordReader`].
pub struct RecordWriter {
    kind: CodecKind,
    frames: FrameWriter,
}

impl RecordWriter {
    pub fn new(kind: CodecKind, io: ByteWriter) -> Self {
        RecordWriter {
            kind,
            frames: FrameWriter::new(io),
        }
    }
}

#[async_trait]
impl CodecWriter for RecordWriter {
    async fn write(&mut self, header: &RpcHeader, body: &[u8]) -> Result<(), RpcError> {
        let header_bytes = self.kind.encode(header)?;
        let mut buf = Vec::with_capacity(
            2 * FRAME_LENGTH_FIELD_SIZE + header_bytes.len() + body.len(),
        );
        FrameWriter::encode_into(&mut buf, &header_bytes);
        FrameWriter::encode_into(&mut buf, body);
        self.frames.write_assembled(&buf).await
    }

    async fn shutdown(&mut self) -> Result<(), RpcError> {
        self.frames.shutdown().await
    }
}
