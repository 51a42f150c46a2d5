mod rpc_server;

pub use rpc_server::RpcServer;
