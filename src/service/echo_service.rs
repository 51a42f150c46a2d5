use super::{InboundCall, ServiceDispatch, ServiceError};
use async_trait::async_trait;
use bytes::Bytes;

/// Canned dispatch used by the demo and smoke tests: ignores the argument
/// and answers `"rpc resp {seq}"`.
pub struct EchoService;

#[async_trait]
impl ServiceDispatch for EchoService {
    async fn dispatch(&self, call: InboundCall) -> Result<Bytes, ServiceError> {
        let reply = format!("rpc resp {}", call.seq);
        let bytes = call
            .codec
            .encode(&reply)
            .map_err(|err| ServiceError::Handler(err.to_string()))?;
        Ok(Bytes::from(bytes))
    }
}
