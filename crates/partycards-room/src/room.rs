//! Room actor: an isolated Tokio task that owns one game session.
//!
//! Each room runs in its own task and is reached only through its command
//! channel, so every join, leave, and game action for the room is applied
//! one at a time, in arrival order.

use std::sync::Arc;

use partycards_game::{CardPool, GameError, GameSession, Phase};
use partycards_protocol::{ClientMessage, PlayerName, RoomName, ServerMessage};
use partycards_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{Broadcaster, PlayerSender, RoomConfig, RoomError};

/// Commands sent to a room actor through its channel.
///
/// Variants carrying a `oneshot::Sender` expect a reply.
pub(crate) enum RoomCommand {
    /// Seat a connection under a player name.
    Join {
        conn_id: ConnectionId,
        name: PlayerName,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Unseat a connection. Replies with the number of members left.
    Leave {
        conn_id: ConnectionId,
        reply: oneshot::Sender<usize>,
    },

    /// A game action from a seated connection.
    Action {
        conn_id: ConnectionId,
        msg: ClientMessage,
    },

    /// Request room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Stop the actor.
    Shutdown,
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room: RoomName,
    pub phase: Phase,
    pub player_count: usize,
    pub max_players: usize,
}

/// Handle to a running room actor.
///
/// Cheap to clone. Connection handlers keep one after joining so their game
/// actions reach the room without going through the registry.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room: RoomName,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room(&self) -> &RoomName {
        &self.room
    }

    /// Asks the room to seat `conn_id` as `name`.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            conn_id,
            name,
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Unseats `conn_id` and returns how many members remain.
    pub async fn leave(&self, conn_id: ConnectionId) -> Result<usize, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            conn_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Forwards a game action (fire-and-forget).
    pub async fn send_action(
        &self,
        conn_id: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Action { conn_id, msg }).await
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room.clone())
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room: RoomName,
    config: RoomConfig,
    session: GameSession,
    members: Broadcaster,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.room, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn_id, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn_id, reply } => {
                    self.handle_leave(conn_id);
                    let _ = reply.send(self.members.len());
                }
                RoomCommand::Action { conn_id, msg } => {
                    self.handle_action(conn_id, msg);
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.room, "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.room, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn_id: ConnectionId,
        name: PlayerName,
        sender: PlayerSender,
    ) -> Result<(), RoomError> {
        if self.members.name_of(conn_id).is_some() {
            return Err(RoomError::AlreadyJoined(conn_id, self.room.clone()));
        }
        if self.members.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.room.clone()));
        }
        self.session
            .add_player(name.clone())
            .map_err(|_| RoomError::DuplicateIdentity(name.clone(), self.room.clone()))?;

        self.members.add(conn_id, name.clone(), sender);
        tracing::info!(
            room = %self.room,
            %conn_id,
            player = %name,
            players = self.members.len(),
            "player joined"
        );

        self.members.send_to(
            conn_id,
            ServerMessage::Joined {
                room: self.room.clone(),
                name,
            },
        );
        self.members.publish_state(&self.session);
        Ok(())
    }

    fn handle_leave(&mut self, conn_id: ConnectionId) {
        let Some(name) = self.members.remove(conn_id) else {
            tracing::debug!(room = %self.room, %conn_id, "leave from non-member, ignoring");
            return;
        };

        match self.session.remove_player(&name) {
            Ok(removal) => {
                tracing::info!(
                    room = %self.room,
                    %conn_id,
                    player = %name,
                    players = self.members.len(),
                    "player left"
                );
                if removal.round_voided {
                    tracing::info!(
                        room = %self.room,
                        judge = %name,
                        phase = %self.session.phase(),
                        "judge left, round voided"
                    );
                }
            }
            Err(error) => {
                tracing::warn!(room = %self.room, player = %name, %error, "member missing from session");
            }
        }

        if !self.members.is_empty() {
            self.members.publish_state(&self.session);
        }
    }

    fn handle_action(&mut self, conn_id: ConnectionId, msg: ClientMessage) {
        let Some(name) = self.members.name_of(conn_id).cloned() else {
            tracing::debug!(
                room = %self.room,
                %conn_id,
                action = msg.kind(),
                "action from non-member, ignoring"
            );
            return;
        };
        let kind = msg.kind();

        let result = match msg {
            ClientMessage::StartGame => self.start_game(),
            ClientMessage::PlayCard { index } => self.session.submit(&name, index),
            ClientMessage::ChooseWinner { player } => self.choose_winner(&name, &player),
            ClientMessage::Chat { text } => {
                self.relay_chat(name, text);
                return;
            }
            ClientMessage::Join { .. } => {
                tracing::debug!(room = %self.room, %conn_id, "join inside a room, ignoring");
                return;
            }
        };

        match result {
            Ok(()) => self.members.publish_state(&self.session),
            Err(error) => {
                tracing::debug!(
                    room = %self.room,
                    player = %name,
                    action = kind,
                    %error,
                    "action rejected"
                );
            }
        }
    }

    fn start_game(&mut self) -> Result<(), GameError> {
        self.session.start()?;
        tracing::info!(
            room = %self.room,
            players = self.session.player_count(),
            "game started"
        );
        Ok(())
    }

    fn choose_winner(&mut self, judge: &PlayerName, winner: &PlayerName) -> Result<(), GameError> {
        let outcome = self.session.choose_winner(judge, winner)?;
        tracing::info!(room = %self.room, winner = %outcome.winner, "round won");

        self.members.announce(&ServerMessage::RoundResult {
            winner: outcome.winner,
            card: outcome.card,
            black_card: outcome.prompt,
        });

        if self.session.phase() == Phase::Finished {
            tracing::info!(room = %self.room, "game finished");
        }
        Ok(())
    }

    fn relay_chat(&self, from: PlayerName, text: String) {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > self.config.max_chat_len {
            tracing::debug!(room = %self.room, player = %from, "chat line dropped");
            return;
        }
        self.members.announce(&ServerMessage::Chat {
            from,
            text: text.to_owned(),
        });
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room: self.room.clone(),
            phase: self.session.phase(),
            player_count: self.members.len(),
            max_players: self.config.max_players,
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// The command channel is bounded by `config.channel_size`; senders wait
/// when it is full.
pub(crate) fn spawn_room(room: RoomName, config: RoomConfig, pool: Arc<CardPool>) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));

    let actor = RoomActor {
        room: room.clone(),
        session: GameSession::new(pool, config.game.clone()),
        config,
        members: Broadcaster::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { room, sender: tx }
}
