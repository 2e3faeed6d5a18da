//! Room registry: creates rooms on demand, binds connections to them, and
//! tears rooms down when their last player leaves.

use std::collections::HashMap;
use std::sync::Arc;

use partycards_game::CardPool;
use partycards_protocol::{ClientMessage, PlayerName, RoomName};
use partycards_transport::ConnectionId;

use crate::room::spawn_room;
use crate::{PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Tracks every live room and which room each connection is bound to.
///
/// A connection is bound to at most one room. The server keeps the registry
/// behind a `tokio::sync::Mutex`, so joins and leaves never race room
/// creation or teardown.
pub struct RoomRegistry {
    config: RoomConfig,
    pool: Arc<CardPool>,
    rooms: HashMap<RoomName, RoomHandle>,
    bindings: HashMap<ConnectionId, RoomName>,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig, pool: Arc<CardPool>) -> Self {
        Self {
            config,
            pool,
            rooms: HashMap::new(),
            bindings: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Joins `conn_id` to `room` as `name`, creating the room if needed.
    ///
    /// Names are trimmed before use; the accepted forms are returned along
    /// with a handle the caller can use for later game actions.
    pub async fn join(
        &mut self,
        room: &str,
        conn_id: ConnectionId,
        name: &str,
        sender: PlayerSender,
    ) -> Result<(RoomHandle, PlayerName), RoomError> {
        if let Some(current) = self.bindings.get(&conn_id) {
            return Err(RoomError::AlreadyJoined(conn_id, current.clone()));
        }
        let room = RoomName::new(self.config.validate_name(room)?);
        let name = PlayerName::new(self.config.validate_name(name)?);

        let (handle, created) = match self.rooms.get(&room) {
            Some(handle) => (handle.clone(), false),
            None => {
                let handle = spawn_room(room.clone(), self.config.clone(), Arc::clone(&self.pool));
                self.rooms.insert(room.clone(), handle.clone());
                tracing::info!(%room, "room created");
                (handle, true)
            }
        };

        if let Err(error) = handle.join(conn_id, name.clone(), sender).await {
            if created {
                self.destroy(&room).await;
            }
            return Err(error);
        }

        self.bindings.insert(conn_id, room);
        Ok((handle, name))
    }

    /// Unbinds `conn_id` from its room and destroys the room if it is now
    /// empty.
    pub async fn leave(&mut self, conn_id: ConnectionId) -> Result<(), RoomError> {
        let room = self
            .bindings
            .remove(&conn_id)
            .ok_or(RoomError::NotJoined(conn_id))?;
        let handle = self
            .rooms
            .get(&room)
            .ok_or_else(|| RoomError::NotFound(room.clone()))?;

        let remaining = match handle.leave(conn_id).await {
            Ok(remaining) => remaining,
            Err(error) => {
                tracing::warn!(%room, %conn_id, %error, "room gone during leave");
                0
            }
        };

        if remaining == 0 {
            self.destroy(&room).await;
        }
        Ok(())
    }

    /// Forwards a game action to the room `conn_id` is bound to.
    pub async fn route(&self, conn_id: ConnectionId, msg: ClientMessage) -> Result<(), RoomError> {
        let room = self
            .bindings
            .get(&conn_id)
            .ok_or(RoomError::NotJoined(conn_id))?;
        let handle = self
            .rooms
            .get(room)
            .ok_or_else(|| RoomError::NotFound(room.clone()))?;
        handle.send_action(conn_id, msg).await
    }

    /// Returns the room `conn_id` is bound to, if any.
    pub fn room_of(&self, conn_id: ConnectionId) -> Option<&RoomName> {
        self.bindings.get(&conn_id)
    }

    pub async fn room_info(&self, room: &RoomName) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room)
            .ok_or_else(|| RoomError::NotFound(room.clone()))?;
        handle.info().await
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists live room names in sorted order.
    pub fn room_names(&self) -> Vec<RoomName> {
        let mut names: Vec<RoomName> = self.rooms.keys().cloned().collect();
        names.sort();
        names
    }

    async fn destroy(&mut self, room: &RoomName) {
        if let Some(handle) = self.rooms.remove(room) {
            let _ = handle.shutdown().await;
            self.bindings.retain(|_, bound| bound != room);
            tracing::info!(%room, "room destroyed");
        }
    }
}
