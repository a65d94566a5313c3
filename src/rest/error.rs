//! Error types for the REST storage client.

use thiserror::Error;

/// Errors raised by the REST storage client.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RestError {
    /// Raised when the high-level configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the request never reaches the management API.
    #[error("transport error: {0}")]
    Transport(String),
    /// Raised when the management API answers with a failure status.
    #[error("management API returned {status}: {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Response body, as returned by the provider.
        message: String,
    },
    /// Raised when a response body cannot be decoded.
    #[error("failed to decode management API response: {0}")]
    Decode(String),
    /// Raised when a long-running operation terminates in a failed state.
    #[error("operation on {resource} failed: {message}")]
    OperationFailed {
        /// Path of the resource the operation targeted.
        resource: String,
        /// Provider-reported failure detail.
        message: String,
    },
    /// Raised when a long-running operation exceeds the wait timeout.
    #[error("operation on {resource} did not reach a terminal state in time")]
    OperationTimeout {
        /// Path of the resource the operation targeted.
        resource: String,
    },
    /// Raised when a pool resource id cannot be split into path segments.
    #[error("malformed pool resource id: {0}")]
    MalformedResourceId(String),
}
