pub mod client;
pub mod codec;
pub mod constants;
pub mod error;
pub mod proto;
pub mod server;
pub mod service;

pub use client::{RpcCall, RpcClient};
pub use error::RpcError;
pub use proto::{ConnectOption, RpcHeader};
pub use server::RpcServer;
pub use service::{EchoService, InboundCall, ServiceDispatch, ServiceError, ServiceRegistry};
