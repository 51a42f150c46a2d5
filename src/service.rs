mod echo_service;
mod service_dispatch;
mod service_error;
mod service_registry;

pub use echo_service::EchoService;
pub use service_dispatch::{InboundCall, ServiceDispatch};
pub use service_error::ServiceError;
pub use service_registry::{RawHandler, ServiceRegistry};
