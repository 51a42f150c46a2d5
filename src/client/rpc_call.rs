use crate::codec::CodecKind;
use crate::error::RpcError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use tokio::sync::oneshot;

/// Completion slot for one in-flight call. Consumed exactly once.
pub(crate) type CallSlot = oneshot::Sender<Result<Bytes, RpcError>>;

/// Handle to one in-flight RPC issued with [`RpcClient::submit`].
///
/// The completion signal fires exactly once: with the reply bytes, with a
/// server-reported error, or with the terminal error of a dying connection.
/// Failures before the wire (argument encoding, registration after close)
/// are delivered the same way.
///
/// [`RpcClient::submit`]: crate::client::RpcClient::submit
pub struct RpcCall<R> {
    seq: u64,
    service_method: String,
    kind: CodecKind,
    slot: oneshot::Receiver<Result<Bytes, RpcError>>,
    _reply: PhantomData<R>,
}

impl<R: DeserializeOwned> RpcCall<R> {
    pub(crate) fn new(
        seq: u64,
        service_method: String,
        kind: CodecKind,
        slot: oneshot::Receiver<Result<Bytes, RpcError>>,
    ) -> Self {
        RpcCall {
            seq,
            service_method,
            kind,
            slot,
            _reply: PhantomData,
        }
    }

    /// A call that completed with `err` before anything reached the wire.
    pub(crate) fn failed(service_method: String, kind: CodecKind, err: RpcError) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(err));
        RpcCall::new(0, service_method, kind, rx)
    }

    /// Sequence number assigned at registration; 0 when the call never
    /// reached the wire.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn service_method(&self) -> &str {
        &self.service_method
    }

    /// Waits for the completion signal and decodes the reply.
    pub async fn recv(self) -> Result<R, RpcError> {
        let bytes = match self.slot.await {
            Ok(outcome) => outcome?,
            // Sender dropped without signaling: the client is gone.
            Err(_) => return Err(RpcError::Shutdown),
        };
        self.kind.decode(&bytes)
    }
}
