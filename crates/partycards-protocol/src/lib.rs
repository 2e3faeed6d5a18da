//! Wire protocol for partycards.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`StateSnapshot`],
//!   and the identity/card newtypes): the structures on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those structures
//!   become text frames.
//! - **Errors** ([`ProtocolError`]): what goes wrong while encoding or
//!   decoding.
//!
//! It knows nothing about rooms or game rules.
//!
//! ```text
//! Transport (text frames) → Protocol (messages) → Room (game actions)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, PlayerName, PlayerSummary, PromptCard, ResponseCard, RoomName,
    ServerMessage, StateSnapshot,
};
