//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// User input rejected before any request was made.
    #[error("{0}")]
    Validation(String),

    /// Request never reached the backend (DNS, connect, timeout).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-2xx status.
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Dispatcher dropped a queued request (e.g. shutdown mid-flight).
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}
