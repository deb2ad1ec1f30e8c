use thiserror::Error;

/// Envelope (de)serialization failure.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Request-level failures surfaced to the sender as a structured `error`
/// response. The `Display` strings are the exact wire messages.
///
/// Every kind is terminal for the single request it belongs to; the
/// connection itself stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Announce asked for an expiry further ahead than the server allows.
    #[error("Maximum expiry of {0} ms exceeded")]
    ExpiryExceeded(i64),

    /// Forwarding request addressed a receiver with no live registry entry.
    #[error("Target agent not registered on server")]
    UnregisteredTarget,

    /// The envelope decoded but the request tag is not part of the protocol.
    #[error("Unknown request type")]
    UnknownRequestType,

    /// The frame could not be decoded into the envelope schema at all.
    #[error("Malformed message: {0}")]
    Malformed(String),
}
