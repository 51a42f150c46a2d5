use super::{InboundCall, ServiceDispatch, ServiceError};
use crate::codec::CodecKind;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type-erased handler: argument record bytes in, reply record bytes out.
pub type RawHandler = Arc<
    dyn Fn(CodecKind, Bytes) -> Pin<Box<dyn Future<Output = Result<Bytes, ServiceError>> + Send>>
        + Send
        + Sync,
>;

/// Method table mapping dotted `"Service.Method"` names to async handlers.
///
/// Handlers are registered at startup, before the registry is handed to a
/// server; lookup is read-only afterwards.
#[derive(Default)]
pub struct ServiceRegistry {
    handlers: HashMap<String, RawHandler>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        ServiceRegistry {
            handlers: HashMap::new(),
        }
    }

    /// Registers a typed async handler.
    ///
    /// The wrapper decodes the argument and encodes the reply with the
    /// calling connection's codec, so one registration serves every
    /// negotiated encoding.
    pub fn register<A, R, F, Fut>(&mut self, service_method: impl Into<String>, handler: F)
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, ServiceError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        let wrapped: RawHandler = Arc::new(move |kind: CodecKind, args: Bytes| {
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let args: A = kind
                    .decode(&args)
                    .map_err(|err| ServiceError::BadRequest(err.to_string()))?;
                let reply = handler(args).await?;
                let bytes = kind
                    .encode(&reply)
                    .map_err(|err| ServiceError::Handler(err.to_string()))?;
                Ok(Bytes::from(bytes))
            })
        });
        self.handlers.insert(service_method.into(), wrapped);
    }

    /// Registers a handler working directly on record bytes.
    pub fn register_raw(&mut self, service_method: impl Into<String>, handler: RawHandler) {
        self.handlers.insert(service_method.into(), handler);
    }

    pub fn contains(&self, service_method: &str) -> bool {
        self.handlers.contains_key(service_method)
    }
}

#[async_trait]
impl ServiceDispatch for ServiceRegistry {
    async fn dispatch(&self, call: InboundCall) -> Result<Bytes, ServiceError> {
        let handler = self
            .handlers
            .get(&call.service_method)
            .ok_or_else(|| ServiceError::MethodNotFound(call.service_method.clone()))?;
        handler(call.codec, call.args).await
    }
}
