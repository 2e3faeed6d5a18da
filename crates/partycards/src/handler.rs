//! Per-connection handler: join, then relay frames between the socket and
//! the player's room.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `join` within the join timeout. Rejected joins get an
//!      `error` frame and may be retried; anything else ends the connection.
//!   2. Loop: forward inbound actions to the room, write outbound messages
//!      from the room to the socket, drop the connection when idle.
//!   3. On exit, leave the room.

use std::sync::Arc;

use partycards_protocol::{ClientMessage, Codec, PlayerName, ProtocolError, ServerMessage};
use partycards_room::{RoomError, RoomHandle};
use partycards_transport::{Connection, ConnectionId, TransportError, WebSocketConnection};
use tokio::sync::mpsc;
use tokio::time::{Instant, timeout_at};

use crate::PartyCardsError;
use crate::server::ServerState;

/// Leaves the room when the handler exits.
///
/// The normal path awaits [`release`](Self::release). If the handler
/// unwinds instead, `Drop` spawns the leave, since it cannot await.
struct RoomGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
    armed: bool,
}

impl<C: Codec> RoomGuard<C> {
    fn new(conn_id: ConnectionId, state: Arc<ServerState<C>>) -> Self {
        Self {
            conn_id,
            state,
            armed: true,
        }
    }

    async fn release(mut self) {
        self.armed = false;
        leave_room(self.conn_id, &self.state).await;
    }
}

impl<C: Codec> Drop for RoomGuard<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            leave_room(conn_id, &state).await;
        });
    }
}

async fn leave_room<C: Codec>(conn_id: ConnectionId, state: &ServerState<C>) {
    let mut registry = state.registry.lock().await;
    if let Err(e) = registry.leave(conn_id).await {
        tracing::debug!(%conn_id, error = %e, "leave failed");
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), PartyCardsError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel();

    // --- Step 1: Join ---
    let Some((room, name)) = await_join(&conn, &state, tx).await? else {
        return Ok(());
    };
    let guard = RoomGuard::new(conn_id, Arc::clone(&state));

    // --- Step 2: Relay loop ---
    let result = relay(&conn, &state, &room, &name, &mut rx).await;

    // --- Step 3: Leave ---
    guard.release().await;
    let _ = conn.close().await;
    tracing::debug!(%conn_id, room = %room.room(), player = %name, "connection finished");
    result
}

/// Waits for a successful `join`.
///
/// Returns `None` if the client hung up first.
async fn await_join<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    tx: mpsc::UnboundedSender<ServerMessage>,
) -> Result<Option<(RoomHandle, PlayerName)>, PartyCardsError> {
    let conn_id = conn.id();
    let deadline = Instant::now() + state.join_timeout;

    loop {
        let frame = match timeout_at(deadline, conn.recv()).await {
            Ok(Ok(Some(frame))) => frame,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "closed before joining");
                return Ok(None);
            }
            Ok(Err(TransportError::InvalidFrame(reason))) => {
                return Err(violation(conn, state, reason).await);
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                send_error(conn, &state.codec, 408, "join timed out").await?;
                let _ = conn.close().await;
                return Err(ProtocolError::InvalidMessage("join timed out".into()).into());
            }
        };

        let (room, name) = match state.codec.decode::<ClientMessage>(&frame) {
            Ok(ClientMessage::Join { room, name }) => (room, name),
            Ok(other) => {
                return Err(violation(
                    conn,
                    state,
                    format!("expected join, got {}", other.kind()),
                )
                .await);
            }
            Err(e) => return Err(violation(conn, state, e.to_string()).await),
        };

        let joined = {
            let mut registry = state.registry.lock().await;
            registry
                .join(room.as_str(), conn_id, name.as_str(), tx.clone())
                .await
        };

        match joined {
            Ok(joined) => return Ok(Some(joined)),
            Err(e) => {
                tracing::debug!(%conn_id, %room, player = %name, error = %e, "join rejected");
                send_error(conn, &state.codec, e.code(), &e.to_string()).await?;
            }
        }
    }
}

/// Pumps frames both ways until the client leaves, goes idle, or breaks
/// protocol.
async fn relay<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    room: &RoomHandle,
    name: &PlayerName,
    rx: &mut mpsc::UnboundedReceiver<ServerMessage>,
) -> Result<(), PartyCardsError> {
    let conn_id = conn.id();
    let mut idle_deadline = Instant::now() + state.idle_timeout;

    loop {
        tokio::select! {
            inbound = timeout_at(idle_deadline, conn.recv()) => {
                let frame = match inbound {
                    Ok(Ok(Some(frame))) => frame,
                    Ok(Ok(None)) => {
                        tracing::info!(%conn_id, player = %name, "connection closed cleanly");
                        return Ok(());
                    }
                    Ok(Err(TransportError::InvalidFrame(reason))) => {
                        return Err(violation(conn, state, reason).await);
                    }
                    Ok(Err(e)) => {
                        tracing::debug!(%conn_id, player = %name, error = %e, "recv error");
                        return Ok(());
                    }
                    Err(_) => {
                        tracing::info!(%conn_id, player = %name, "connection idle, dropping");
                        return Ok(());
                    }
                };
                idle_deadline = Instant::now() + state.idle_timeout;

                let msg: ClientMessage = match state.codec.decode(&frame) {
                    Ok(msg) => msg,
                    Err(e) => return Err(violation(conn, state, e.to_string()).await),
                };

                if let ClientMessage::Join { .. } = msg {
                    let e = RoomError::AlreadyJoined(conn_id, room.room().clone());
                    send_error(conn, &state.codec, e.code(), &e.to_string()).await?;
                    continue;
                }

                room.send_action(conn_id, msg).await?;
            }
            Some(msg) = rx.recv() => {
                let frame = state.codec.encode(&msg)?;
                conn.send(&frame).await?;
            }
        }
    }
}

/// Sends an `error` frame with code 400 and closes the connection.
///
/// Returns the error the handler should end with.
async fn violation<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    reason: String,
) -> PartyCardsError {
    tracing::debug!(conn_id = %conn.id(), %reason, "protocol violation");
    if let Err(e) = send_error(conn, &state.codec, 400, &format!("bad request: {reason}")).await {
        return e;
    }
    let _ = conn.close().await;
    ProtocolError::InvalidMessage(reason).into()
}

/// Sends a `ServerMessage::Error` frame to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: u16,
    message: &str,
) -> Result<(), PartyCardsError> {
    let frame = codec.encode(&ServerMessage::Error {
        code,
        message: message.to_string(),
    })?;
    conn.send(&frame).await?;
    Ok(())
}
