/// Protocol identification constant carried in the connect handshake.
pub const MAGIC_NUMBER: u32 = 0x3bef5c;

/// Size in bytes of the length prefix preceding every wire record.
pub const FRAME_LENGTH_FIELD_SIZE: usize = 4;

/// Upper bound on a single framed record (header or body).
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Chunk size used when draining an oversized record off the stream.
pub const FRAME_DRAIN_CHUNK_SIZE: usize = 8 * 1024;
