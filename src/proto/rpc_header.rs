use serde::{Deserialize, Serialize};

/// Fixed metadata record accompanying every request and every response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RpcHeader {
    /// Dotted `"Service.Method"` identifier resolved by the dispatch layer.
    pub service_method: String,

    /// Correlation number chosen by the client, unique per direction while
    /// the call is outstanding. 0 is reserved and never assigned.
    pub seq: u64,

    /// Empty on success; otherwise the error reported by the remote side.
    pub error: String,
}
