//! Per-player state fan-out.
//!
//! After every accepted action the room pushes a fresh [`StateSnapshot`] to
//! each member. Snapshots are built per recipient: a player sees only their
//! own hand, and only the judge sees the cards played this round.

use std::collections::BTreeMap;

use partycards_game::GameSession;
use partycards_protocol::{PlayerName, PlayerSummary, ServerMessage, StateSnapshot};
use partycards_transport::ConnectionId;
use tokio::sync::mpsc;

/// Channel for delivering outbound messages to one connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// A connection seated in a room.
#[derive(Debug)]
struct Member {
    name: PlayerName,
    sender: PlayerSender,
}

/// Builds the view of `session` that `viewer` is allowed to see.
pub fn snapshot_for(session: &GameSession, viewer: &PlayerName) -> StateSnapshot {
    let judge = session.judge().cloned();
    let is_judge = judge.as_ref() == Some(viewer);

    let submissions = (is_judge && !session.submissions().is_empty())
        .then(|| session.submissions().clone());

    StateSnapshot {
        players: session
            .players()
            .iter()
            .map(|p| PlayerSummary {
                name: p.name().clone(),
                score: p.score(),
            })
            .collect(),
        judge,
        black_card: session.current_prompt().cloned(),
        hand: session
            .player(viewer)
            .map(|p| p.hand().to_vec())
            .unwrap_or_default(),
        started: session.is_started(),
        ready: session.is_ready_to_judge(),
        submissions,
    }
}

/// The connections seated in one room and their outbound channels.
#[derive(Debug, Default)]
pub struct Broadcaster {
    members: BTreeMap<ConnectionId, Member>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a connection under `name`.
    pub fn add(&mut self, conn_id: ConnectionId, name: PlayerName, sender: PlayerSender) {
        self.members.insert(conn_id, Member { name, sender });
    }

    /// Unseats a connection, returning the name it played under.
    pub fn remove(&mut self, conn_id: ConnectionId) -> Option<PlayerName> {
        self.members.remove(&conn_id).map(|m| m.name)
    }

    pub fn name_of(&self, conn_id: ConnectionId) -> Option<&PlayerName> {
        self.members.get(&conn_id).map(|m| &m.name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sends one message to a single connection.
    pub fn send_to(&self, conn_id: ConnectionId, msg: ServerMessage) {
        if let Some(member) = self.members.get(&conn_id) {
            deliver(conn_id, member, msg);
        }
    }

    /// Sends the same message to every member.
    pub fn announce(&self, msg: &ServerMessage) {
        for (conn_id, member) in &self.members {
            deliver(*conn_id, member, msg.clone());
        }
    }

    /// Pushes each member their own view of `session`.
    pub fn publish_state(&self, session: &GameSession) {
        for (conn_id, member) in &self.members {
            let snapshot = snapshot_for(session, &member.name);
            deliver(*conn_id, member, ServerMessage::State(snapshot));
        }
    }
}

/// A closed channel means the connection task already exited; its `Leave`
/// is on the way.
fn deliver(conn_id: ConnectionId, member: &Member, msg: ServerMessage) {
    if member.sender.send(msg).is_err() {
        tracing::trace!(%conn_id, player = %member.name, "outbound channel closed");
    }
}
