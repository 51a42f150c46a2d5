use std::fmt;

/// Error a dispatch capability reports for one request. Rendered into the
/// response header's error string; never fatal to the connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// No handler is registered under the requested name.
    MethodNotFound(String),

    /// The argument could not be decoded for the resolved handler.
    BadRequest(String),

    /// The handler ran and failed.
    Handler(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::MethodNotFound(method) => write!(f, "method not found: {}", method),
            ServiceError::BadRequest(reason) => write!(f, "bad request: {}", reason),
            ServiceError::Handler(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for ServiceError {}
