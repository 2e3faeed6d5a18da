//! Game configuration.

use serde::{Deserialize, Serialize};

/// Tunable rules for one game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Hands are topped up to this many response cards every round.
    pub hand_size: usize,

    /// Players required before `start_game` is accepted. One of them
    /// judges, so fewer than two leaves nobody to play a card.
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            hand_size: 7,
            min_players: 2,
        }
    }
}
