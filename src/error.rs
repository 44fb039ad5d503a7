// src/error.rs
use thiserror::Error;

/// Failures surfaced to the user by the transport layer.
///
/// The normalizer has no error kind of its own: it always produces output
/// plus advisory warnings. Everything here is caught at the initiating
/// action and rendered as a message, never a panic.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Required input missing or invalid; raised before any network call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request sent but no response received (connectivity or timeout).
    #[error("Network error: cannot reach server at {base_url}")]
    Network { base_url: String },

    /// Response received with a non-success status.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// 2xx response that fails the minimal shape check.
    #[error("Invalid response from server ({0}), please retry")]
    MalformedResponse(String),

    /// Rejected because another request is already in flight on this client.
    #[error("A request is already in flight, retry once it completes")]
    RequestInFlight,
}
