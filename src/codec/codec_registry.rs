use super::{ByteReader, ByteWriter, CodecKind, CodecReader, CodecWriter, RecordReader, RecordWriter};
use crate::error::RpcError;
use std::collections::HashMap;

/// Constructor invoked once per connection after the handshake selects a
/// codec tag.
pub type CodecConstructor = Box<
    dyn Fn(ByteReader, ByteWriter) -> (Box<dyn CodecReader>, Box<dyn CodecWriter>) + Send + Sync,
>;

/// Explicit tag-to-constructor lookup, owned by whichever side builds
/// connections.
///
/// Registration happens at startup; there is no process-wide default map.
pub struct CodecRegistry {
    constructors: HashMap<String, CodecConstructor>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        CodecRegistry {
            constructors: HashMap::new(),
        }
    }

    /// Registry carrying the built-in bitcode and JSON codecs.
    pub fn with_defaults() -> Self {
        let mut registry = CodecRegistry::new();
        for kind in [CodecKind::Bitcode, CodecKind::Json] {
            registry.register(
                kind.tag(),
                Box::new(move |reader, writer| {
                    (
                        Box::new(RecordReader::new(kind, reader)) as Box<dyn CodecReader>,
                        Box::new(RecordWriter::new(kind, writer)) as Box<dyn CodecWriter>,
                    )
                }),
            );
        }
        registry
    }

    pub fn register(&mut self, tag: impl Into<String>, constructor: CodecConstructor) {
        self.constructors.insert(tag.into(), constructor);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Builds the codec pair for `tag` over the given stream halves.
    pub fn build(
        &self,
        tag: &str,
        reader: ByteReader,
        writer: ByteWriter,
    ) -> Result<(Box<dyn CodecReader>, Box<dyn CodecWriter>), RpcError> {
        match self.constructors.get(tag) {
            Some(constructor) => Ok(constructor(reader, writer)),
            None => Err(RpcError::UnknownCodec(tag.to_string())),
        }
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        CodecRegistry::with_defaults()
    }
}
