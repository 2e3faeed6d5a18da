//! Error types for the room layer.

use partycards_protocol::{PlayerName, RoomName};
use partycards_transport::ConnectionId;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomName),

    /// The room already has its maximum number of players.
    #[error("room {0} is full")]
    RoomFull(RoomName),

    /// Someone in the room is already using this name.
    #[error("name {0} is already taken in room {1}")]
    DuplicateIdentity(PlayerName, RoomName),

    /// A blank, overlong, or otherwise unusable room or player name.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The connection is already seated in a room.
    #[error("{0} already joined room {1}")]
    AlreadyJoined(ConnectionId, RoomName),

    /// The connection has not joined any room.
    #[error("{0} has not joined a room")]
    NotJoined(ConnectionId),

    /// The room's command channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomName),
}

impl RoomError {
    /// HTTP-style status code sent to the client in an `error` frame.
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidName(_) => 400,
            Self::RoomFull(_) => 403,
            Self::NotFound(_) | Self::NotJoined(_) => 404,
            Self::DuplicateIdentity(..) | Self::AlreadyJoined(..) => 409,
            Self::Unavailable(_) => 503,
        }
    }
}
