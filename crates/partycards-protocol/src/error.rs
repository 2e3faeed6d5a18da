//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes on the wire were wrong: they
//! could not be produced, could not be parsed, or parsed into a message that
//! is not allowed at this point of the conversation.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into a frame).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a frame into a message).
    ///
    /// Common causes: malformed JSON, an unknown `action` tag, missing
    /// fields, or a negative card index.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed, but breaks the conversation rules, e.g. a
    /// `play_card` arriving before the connection has joined a room.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
