//! Unified error type for the partycards server.

use partycards_game::CardPoolError;
use partycards_protocol::ProtocolError;
use partycards_room::RoomError;
use partycards_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum PartyCardsError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, duplicate name, unavailable).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Unusable card content.
    #[error(transparent)]
    Cards(#[from] CardPoolError),

    /// Reading a card file failed.
    #[error("failed to read card file: {0}")]
    Io(#[from] std::io::Error),
}
