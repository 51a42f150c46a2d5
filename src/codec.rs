mod codec_interface;
mod codec_kind;
mod codec_registry;
mod frame_stream;
mod record_codec;

pub use codec_interface::{ByteReader, ByteWriter, CodecReader, CodecWriter};
pub use codec_kind::CodecKind;
pub use codec_registry::{CodecConstructor, CodecRegistry};
pub use frame_stream::{FrameReader, FrameWriter};
pub use record_codec::{RecordReader, RecordWriter};
