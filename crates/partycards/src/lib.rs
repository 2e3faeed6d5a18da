//! # partycards
//!
//! A WebSocket server for a fill-in-the-blank party card game.
//!
//! Players join named rooms, take turns judging, and play response cards
//! against a prompt. Each room runs as its own actor; this crate wires the
//! rooms to WebSocket connections speaking JSON.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use partycards::prelude::*;
//!
//! # async fn start() -> Result<(), PartyCardsError> {
//! let server = PartyCardsServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::PartyCardsError;
pub use server::{
    DEFAULT_IDLE_TIMEOUT, DEFAULT_JOIN_TIMEOUT, PartyCardsServer, PartyCardsServerBuilder,
};

/// Convenient re-exports for running a server.
pub mod prelude {
    pub use crate::{PartyCardsError, PartyCardsServer, PartyCardsServerBuilder};
    pub use partycards_game::{CardPool, GameConfig};
    pub use partycards_protocol::{ClientMessage, ServerMessage, StateSnapshot};
    pub use partycards_room::RoomConfig;
}
