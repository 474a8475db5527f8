//! Server error types.

use thiserror::Error;

/// Errors raised by the server and the transport adapters.
///
/// Request-level failures never surface here: the dispatcher turns them into
/// envelope responses.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The configured address is invalid or cannot be bound.
    #[error("bind error: {0}")]
    Bind(String),

    /// I/O error during server operation.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A gateway event could not be turned into a request.
    #[error("invalid gateway event: {0}")]
    InvalidEvent(String),
}
