mod rpc_call;
mod rpc_client;

pub use rpc_call::RpcCall;
pub use rpc_client::RpcClient;
