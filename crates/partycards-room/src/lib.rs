//! Rooms for partycards.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! room's [`GameSession`](partycards_game::GameSession) and the outbound
//! channels of its members.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates/destroys rooms, binds connections to them
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`Broadcaster`]: per-player state snapshots
//! - [`RoomConfig`]: room settings (player limits, name lengths, etc.)

mod broadcast;
mod config;
mod error;
mod registry;
mod room;

pub use broadcast::{Broadcaster, PlayerSender, snapshot_for};
pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{RoomHandle, RoomInfo};
