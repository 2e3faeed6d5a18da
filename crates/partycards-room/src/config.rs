//! Room configuration and name validation.

use partycards_game::GameConfig;
use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings applied to every room the registry creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Maximum players seated in one room.
    pub max_players: usize,

    /// Longest accepted room or player name, in characters.
    pub max_name_len: usize,

    /// Longest accepted chat line, in characters.
    pub max_chat_len: usize,

    /// Capacity of each room actor's command queue.
    pub channel_size: usize,

    /// Rules for the game session inside the room.
    pub game: GameConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 10,
            max_name_len: 32,
            max_chat_len: 280,
            channel_size: 64,
            game: GameConfig::default(),
        }
    }
}

impl RoomConfig {
    /// Trims `raw` and checks it is usable as a room or player name.
    pub fn validate_name(&self, raw: &str) -> Result<String, RoomError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(RoomError::InvalidName("name must not be blank".into()));
        }
        if name.chars().count() > self.max_name_len {
            return Err(RoomError::InvalidName(format!(
                "name longer than {} characters",
                self.max_name_len
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(RoomError::InvalidName(
                "name contains control characters".into(),
            ));
        }
        Ok(name.to_owned())
    }
}
