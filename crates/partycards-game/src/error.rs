//! Error types for the game layer.

use partycards_protocol::PlayerName;

/// Drawing from an empty pile.
///
/// Never fatal: the session turns it into a short hand or the end of the
/// game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    #[error("deck exhausted")]
    Exhausted,
}

/// Card content that cannot be played with.
#[derive(Debug, thiserror::Error)]
pub enum CardPoolError {
    /// No usable prompt cards after dropping blanks and duplicates.
    #[error("card pool has no prompt cards")]
    NoPrompts,

    /// No usable response cards after dropping blanks and duplicates.
    #[error("card pool has no response cards")]
    NoResponses,

    /// The card file is not a `{"prompts": [...], "responses": [...]}`
    /// document.
    #[error("invalid card file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// An action the session refused.
///
/// Every variant leaves the session untouched. The room layer drops these
/// without broadcasting, except `DuplicateIdentity` which rejects a join.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("player {0} is already in this game")]
    DuplicateIdentity(PlayerName),

    #[error("player {0} is not in this game")]
    UnknownPlayer(PlayerName),

    #[error("game has already started")]
    AlreadyStarted,

    #[error("need at least {needed} players to start, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },

    #[error("no round in progress")]
    NotInProgress,

    #[error("the judge cannot play a card")]
    JudgeCannotSubmit,

    #[error("player {0} already played a card this round")]
    AlreadySubmitted(PlayerName),

    #[error("card index {index} out of range for a hand of {hand_size}")]
    InvalidCardIndex { index: usize, hand_size: usize },

    #[error("player {0} is not the judge")]
    NotJudge(PlayerName),

    #[error("not every player has played a card yet")]
    NotReady,

    #[error("player {0} has no card in play this round")]
    NoSubmission(PlayerName),
}
