//! Game rules for partycards.
//!
//! Everything in this crate is synchronous and owned: a [`GameSession`] is
//! mutated by exactly one room actor, so nothing here locks or awaits.
//!
//! # Key types
//!
//! - [`CardPool`]: the immutable card content a server is started with
//! - [`Deck`]: a per-game shuffled draw pile
//! - [`Player`]: name, hand, and score
//! - [`GameSession`]: the round state machine
//! - [`GameConfig`]: hand size and minimum players

mod config;
mod deck;
mod error;
mod player;
mod session;

pub use config::GameConfig;
pub use deck::{CardPool, Deck};
pub use error::{CardPoolError, DeckError, GameError};
pub use player::Player;
pub use session::{GameSession, Phase, Removal, RoundOutcome};
