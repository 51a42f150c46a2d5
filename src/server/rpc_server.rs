use crate::codec::{
    ByteReader, ByteWriter, CodecKind, CodecReader, CodecRegistry, CodecWriter, FrameReader,
};
use crate::constants::MAGIC_NUMBER;
use crate::error::RpcError;
use crate::proto::{ConnectOption, RpcHeader};
use crate::service::{InboundCall, ServiceDispatch};
use bytes::Bytes;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;

/// Write half of a connection, shared by its concurrent handler tasks so
/// that responses never interleave on the wire.
type SharedWriter = Arc<AsyncMutex<Box<dyn CodecWriter>>>;

/// RPC server: accepts connections, negotiates a codec per connection, and
/// dispatches every decoded request concurrently.
pub struct RpcServer {
    service: Arc<dyn ServiceDispatch>,
    codecs: CodecRegistry,
}

impl RpcServer {
    pub fn new(service: Arc<dyn ServiceDispatch>) -> Self {
        RpcServer {
            service,
            codecs: CodecRegistry::with_defaults(),
        }
    }

    /// Replaces the codec registry, e.g. to carry custom encodings.
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.codecs = codecs;
        self
    }

    /// Binds `addr` and serves until the listener fails.
    pub async fn serve<A: ToSocketAddrs>(self: Arc<Self>, addr: A) -> Result<(), RpcError> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("server listening on {:?}", listener.local_addr()?);
        self.accept(listener).await;
        Ok(())
    }

    /// Accepts connections until the listener reports a fatal error.
    ///
    /// Connections already being served are unaffected when the accept
    /// loop stops.
    pub async fn accept(self: Arc<Self>, listener: TcpListener) {
        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    tracing::debug!("connection accepted from {}", peer);
                    let server = Arc::clone(&self);
                    tokio::spawn(server.serve_connection(stream));
                }
                Err(err) => {
                    tracing::error!("accept failed, stopping accept loop: {}", err);
                    return;
                }
            }
        }
    }

    /// Serves one established byte stream: handshake first, then the
    /// read-dispatch-write loop until the stream ends.
    pub async fn serve_connection<S>(self: Arc<Self>, stream: S)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader_half, writer_half) = tokio::io::split(stream);
        let reader: ByteReader = Box::new(reader_half);
        let writer: ByteWriter = Box::new(writer_half);
        match self.negotiate(reader, writer).await {
            Ok((kind, codec_reader, codec_writer)) => {
                self.serve_codec(kind, codec_reader, codec_writer).await;
            }
            Err(err) => {
                tracing::warn!("connection rejected during handshake: {}", err);
            }
        }
    }

    /// Reads and validates the connect option, then constructs the codec.
    ///
    /// The option record uses its own JSON framing: the codec it selects
    /// does not exist yet. Any failure here tears down only this
    /// connection, before any header or body is exchanged.
    async fn negotiate(
        &self,
        reader: ByteReader,
        writer: ByteWriter,
    ) -> Result<(CodecKind, Box<dyn CodecReader>, Box<dyn CodecWriter>), RpcError> {
        let mut raw = FrameReader::new(reader);
        let frame = raw.read_frame().await?;
        let option: ConnectOption =
            serde_json::from_slice(&frame).map_err(|err| RpcError::Decode(err.to_string()))?;
        if option.magic != MAGIC_NUMBER {
            return Err(RpcError::BadMagic(option.magic));
        }
        let kind = CodecKind::from_tag(&option.codec)
            .ok_or_else(|| RpcError::UnknownCodec(option.codec.clone()))?;
        let (codec_reader, codec_writer) =
            self.codecs.build(&option.codec, raw.into_inner(), writer)?;
        Ok((kind, codec_reader, codec_writer))
    }

    /// Read loop plus concurrent dispatch.
    ///
    /// The shared writer lock keeps responses from interleaving; the join
    /// set keeps the codec open until every in-flight handler has written
    /// its response.
    async fn serve_codec(
        &self,
        kind: CodecKind,
        mut reader: Box<dyn CodecReader>,
        writer: Box<dyn CodecWriter>,
    ) {
        let writer: SharedWriter = Arc::new(AsyncMutex::new(writer));
        let mut handlers: JoinSet<()> = JoinSet::new();
        loop {
            let header = match reader.read_header().await {
                Ok(header) => header,
                Err(err) => {
                    // Normal stream end or a dead transport; nothing is
                    // sent back either way.
                    tracing::debug!("request header read ended: {}", err);
                    break;
                }
            };
            let args = match reader.read_body().await {
                Ok(args) => args,
                Err(err @ RpcError::FrameTooLarge { .. }) => {
                    // The oversized body was drained, so the stream is
                    // still aligned; report it on this call and keep
                    // serving.
                    let mut header = header;
                    header.error = err.to_string();
                    Self::send_response(&writer, &header, &[]).await;
                    continue;
                }
                Err(err) => {
                    tracing::debug!("request body read failed: {}", err);
                    break;
                }
            };
            handlers.spawn(Self::handle_request(
                Arc::clone(&self.service),
                Arc::clone(&writer),
                kind,
                header,
                args,
            ));
        }
        // Every spawned handler writes exactly one response; the codec
        // must outlive them all.
        while handlers.join_next().await.is_some() {}
        let mut writer = writer.lock().await;
        if let Err(err) = writer.shutdown().await {
            tracing::debug!("connection shutdown failed: {}", err);
        }
    }

    /// Runs the dispatch capability for one request and writes exactly one
    /// response through the shared writer.
    async fn handle_request(
        service: Arc<dyn ServiceDispatch>,
        writer: SharedWriter,
        kind: CodecKind,
        mut header: RpcHeader,
        args: Bytes,
    ) {
        let call = InboundCall {
            service_method: header.service_method.clone(),
            seq: header.seq,
            codec: kind,
            args,
        };
        match service.dispatch(call).await {
            Ok(reply) => {
                header.error.clear();
                Self::send_response(&writer, &header, &reply).await;
            }
            Err(err) => {
                tracing::debug!(
                    "handler for {} (seq {}) failed: {}",
                    header.service_method,
                    header.seq,
                    err
                );
                header.error = err.to_string();
                Self::send_response(&writer, &header, &[]).await;
            }
        }
    }

    async fn send_response(writer: &SharedWriter, header: &RpcHeader, body: &[u8]) {
        let mut writer = writer.lock().await;
        if let Err(err) = writer.write(header, body).await {
            tracing::error!("response write for seq {} failed: {}", header.seq, err);
        }
    }
}
