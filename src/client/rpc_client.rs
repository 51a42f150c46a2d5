use super::rpc_call::{CallSlot, RpcCall};
use crate::codec::{
    ByteReader, ByteWriter, CodecKind, CodecReader, CodecRegistry, CodecWriter, FrameWriter,
};
use crate::error::RpcError;
use crate::proto::{ConnectOption, RpcHeader};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{Mutex as AsyncMutex, oneshot};

/// Pending-call registry and connection flags. Guarded by one lock held
/// only for map and flag operations, never across I/O.
struct ClientState {
    next_seq: u64,
    pending: HashMap<u64, CallSlot>,
    closing: bool,
    shutdown: bool,
}

impl ClientState {
    fn new() -> Self {
        ClientState {
            next_seq: 1,
            pending: HashMap::new(),
            closing: false,
            shutdown: false,
        }
    }
}

/// Write half of the connection plus the reusable outbound header, guarded
/// by the sending lock so wire writes from different calls never
/// interleave.
struct Sender {
    codec: Box<dyn CodecWriter>,
    header: RpcHeader,
}

/// RPC client multiplexing any number of concurrent callers over one
/// connection.
///
/// One background task owns the read half and fans responses back to the
/// callers waiting on their completion slots; sequence numbers restore the
/// caller-to-response association regardless of arrival order.
pub struct RpcClient {
    kind: CodecKind,
    sender: Arc<AsyncMutex<Sender>>,
    state: Arc<Mutex<ClientState>>,
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient").field("kind", &self.kind).finish()
    }
}

impl RpcClient {
    /// Connects over TCP and performs the codec handshake.
    pub async fn dial<A: ToSocketAddrs>(addr: A, option: ConnectOption) -> Result<Self, RpcError> {
        let stream = TcpStream::connect(addr).await?;
        Self::connect(stream, option, &CodecRegistry::with_defaults()).await
    }

    /// Performs the handshake over an established byte stream.
    ///
    /// The option record goes out first in its own JSON framing; the
    /// selected codec owns the connection from then on.
    pub async fn connect<S>(
        stream: S,
        option: ConnectOption,
        codecs: &CodecRegistry,
    ) -> Result<Self, RpcError>
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let kind = CodecKind::from_tag(&option.codec)
            .filter(|_| codecs.contains(&option.codec))
            .ok_or_else(|| RpcError::UnknownCodec(option.codec.clone()))?;

        let (reader_half, writer_half) = tokio::io::split(stream);
        let reader: ByteReader = Box::new(reader_half);
        let writer: ByteWriter = Box::new(writer_half);

        let option_bytes =
            serde_json::to_vec(&option).map_err(|err| RpcError::Encode(err.to_string()))?;
        let mut raw = FrameWriter::new(writer);
        raw.write_frame(&option_bytes).await?;

        let (codec_reader, codec_writer) = codecs.build(&option.codec, reader, raw.into_inner())?;
        Ok(Self::with_codec(kind, codec_reader, codec_writer))
    }

    /// Builds a client from an established codec pair and starts the
    /// receive loop.
    pub fn with_codec(
        kind: CodecKind,
        reader: Box<dyn CodecReader>,
        writer: Box<dyn CodecWriter>,
    ) -> Self {
        let state = Arc::new(Mutex::new(ClientState::new()));
        let sender = Arc::new(AsyncMutex::new(Sender {
            codec: writer,
            header: RpcHeader::default(),
        }));
        tokio::spawn(Self::receive_loop(
            reader,
            Arc::clone(&state),
            Arc::clone(&sender),
        ));
        RpcClient {
            kind,
            sender,
            state,
        }
    }

    /// Invokes `service_method` and waits for the matching response.
    pub async fn call<A, R>(&self, service_method: &str, args: &A) -> Result<R, RpcError>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        self.submit(service_method, args).await.recv().await
    }

    /// Asynchronous entry point: registers and sends the call, returning a
    /// handle whose completion fires exactly once.
    pub async fn submit<A, R>(&self, service_method: &str, args: &A) -> RpcCall<R>
    where
        A: Serialize,
        R: DeserializeOwned,
    {
        let body = match self.kind.encode(args) {
            Ok(body) => body,
            Err(err) => return RpcCall::failed(service_method.to_string(), self.kind, err),
        };
        let (tx, rx) = oneshot::channel();
        let seq = self.send(service_method, &body, tx).await;
        RpcCall::new(seq, service_method.to_string(), self.kind, rx)
    }

    /// True while the client can still register new calls.
    pub fn is_available(&self) -> bool {
        let state = self.state.lock().unwrap();
        !state.closing && !state.shutdown
    }

    /// Closes the client. The second and subsequent calls observe the
    /// closing flag and fail with [`RpcError::Shutdown`].
    pub async fn close(&self) -> Result<(), RpcError> {
        {
            let mut state = self.state.lock().unwrap();
            if state.closing {
                return Err(RpcError::Shutdown);
            }
            state.closing = true;
        }
        let mut sender = self.sender.lock().await;
        sender.codec.shutdown().await
    }

    /// Registers the call and writes it to the wire. Returns the assigned
    /// sequence number, or 0 when the outcome was already delivered
    /// through the slot without reaching the wire.
    ///
    /// The sending lock is taken first: registration and the write need
    /// not be one atomic step, but writes from different calls must never
    /// interleave.
    async fn send(&self, service_method: &str, body: &[u8], slot: CallSlot) -> u64 {
        let mut sender = self.sender.lock().await;
        let seq = match Self::register_call(&self.state, slot) {
            Ok(seq) => seq,
            Err((slot, err)) => {
                let _ = slot.send(Err(err));
                return 0;
            }
        };
        let Sender { codec, header } = &mut *sender;
        header.service_method = service_method.to_string();
        header.seq = seq;
        header.error.clear();
        if let Err(err) = codec.write(header, body).await {
            // The receive loop may have raced and completed the call
            // already; deliver the write error only if it is still pending.
            if let Some(slot) = Self::take_pending(&self.state, seq) {
                let _ = slot.send(Err(err));
            }
        }
        seq
    }

    fn register_call(
        state: &Mutex<ClientState>,
        slot: CallSlot,
    ) -> Result<u64, (CallSlot, RpcError)> {
        let mut state = state.lock().unwrap();
        if state.closing || state.shutdown {
            return Err((slot, RpcError::Shutdown));
        }
        let seq = state.next_seq;
        state.pending.insert(seq, slot);
        state.next_seq += 1;
        Ok(seq)
    }

    fn take_pending(state: &Mutex<ClientState>, seq: u64) -> Option<CallSlot> {
        state.lock().unwrap().pending.remove(&seq)
    }

    /// Fans responses back to waiting callers until the transport fails,
    /// then terminates every remaining pending call.
    async fn receive_loop(
        mut reader: Box<dyn CodecReader>,
        state: Arc<Mutex<ClientState>>,
        sender: Arc<AsyncMutex<Sender>>,
    ) {
        let fatal = loop {
            let header = match reader.read_header().await {
                Ok(header) => header,
                Err(err) => break err,
            };
            match Self::take_pending(&state, header.seq) {
                // The write partially failed and the call is already gone;
                // the body still has to come off the stream.
                None => match reader.read_body().await {
                    Ok(_) | Err(RpcError::FrameTooLarge { .. }) => {}
                    Err(err) => break err,
                },
                Some(slot) if !header.error.is_empty() => {
                    let discard = reader.read_body().await;
                    let _ = slot.send(Err(RpcError::Remote(header.error)));
                    match discard {
                        Ok(_) | Err(RpcError::FrameTooLarge { .. }) => {}
                        Err(err) => break err,
                    }
                }
                Some(slot) => match reader.read_body().await {
                    Ok(bytes) => {
                        let _ = slot.send(Ok(bytes));
                    }
                    // Oversized reply: this call's problem only, the
                    // stream is still aligned.
                    Err(err @ RpcError::FrameTooLarge { .. }) => {
                        let _ = slot.send(Err(err));
                    }
                    Err(err) => {
                        let _ = slot.send(Err(RpcError::ConnectionLost(err.to_string())));
                        break err;
                    }
                },
            }
        };
        tracing::debug!("client receive loop ended: {}", fatal);
        Self::terminate_calls(&state, &sender, &fatal).await;
    }

    /// Fails every pending call and marks the client shut down. Holds the
    /// sending lock and then the state lock, in that order, so it cannot
    /// race an in-flight `send`.
    async fn terminate_calls(
        state: &Mutex<ClientState>,
        sender: &AsyncMutex<Sender>,
        fatal: &RpcError,
    ) {
        let _sender = sender.lock().await;
        let mut state = state.lock().unwrap();
        state.shutdown = true;
        for (_, slot) in state.pending.drain() {
            let _ = slot.send(Err(RpcError::ConnectionLost(fatal.to_string())));
        }
    }
}
