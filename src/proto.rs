mod connect_option;
mod rpc_header;

pub use connect_option::ConnectOption;
pub use rpc_header::RpcHeader;
