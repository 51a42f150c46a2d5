use super::ServiceError;
use crate::codec::CodecKind;
use async_trait::async_trait;
use bytes::Bytes;

/// One decoded request as seen by the dispatch capability.
#[derive(Debug)]
pub struct InboundCall {
    /// Dotted `"Service.Method"` identifier from the request header.
    pub service_method: String,

    /// Sequence number from the request header.
    pub seq: u64,

    /// Wire encoding negotiated for this connection. Handlers use it to
    /// decode the argument and encode the reply.
    pub codec: CodecKind,

    /// Raw body record carrying the encoded argument.
    pub args: Bytes,
}

/// Server-side capability that executes a named method against a decoded
/// argument, producing encoded reply bytes or an error.
///
/// How implementations resolve names to handlers is up to them; the server
/// core only guarantees that every inbound request is dispatched exactly
/// once and answered exactly once.
#[async_trait]
pub trait ServiceDispatch: Send + Sync {
    async fn dispatch(&self, call: InboundCall) -> Result<Bytes, ServiceError>;
}
