//! Core protocol types for the partycards wire format.
//!
//! Every type here travels "on the wire": clients send [`ClientMessage`]
//! frames and receive [`ServerMessage`] frames, both as JSON objects.
//!
//! ```text
//! client → server   {"action":"join","room":"R1","name":"Ana"}
//! server → client   {"type":"state","players":[...],"hand":[...],...}
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity and card types
// ---------------------------------------------------------------------------

/// The display name a player joins with.
///
/// Names are the player identity inside a room: they must be unique per
/// room for as long as the player stays connected. `#[serde(transparent)]`
/// keeps it a plain JSON string, so it can also be used as a map key in
/// the judge's `submissions` view.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    /// Wraps a name. Validation (length, blank names) happens at join time.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The name of a room. Any client that joins with the same name lands in
/// the same game.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(String);

impl RoomName {
    /// Wraps a room name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A fill-in-the-blank card drawn once per round (the "black card").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptCard(String);

impl PromptCard {
    /// Creates a prompt card with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The card text.
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A card held in a player's hand and played in answer to the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseCard(String);

impl ResponseCard {
    /// Creates a response card with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The card text.
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResponseCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// ClientMessage: inbound actions
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// `#[serde(tag = "action", rename_all = "snake_case")]` produces
/// internally tagged JSON such as `{"action":"play_card","index":3}`.
/// Unknown actions fail to decode, which the handler treats as a protocol
/// violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Join (or create) a room under a display name. Must be the first
    /// message on a connection.
    Join { room: RoomName, name: PlayerName },

    /// Deal hands and draw the first prompt.
    StartGame,

    /// Submit the card at `index` in the sender's hand for this round.
    PlayCard { index: usize },

    /// Judge only: pick the round winner by name.
    ChooseWinner { player: PlayerName },

    /// A free-form chat line relayed to everyone in the room.
    Chat { text: String },
}

impl ClientMessage {
    /// Short action name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::StartGame => "start_game",
            Self::PlayCard { .. } => "play_card",
            Self::ChooseWinner { .. } => "choose_winner",
            Self::Chat { .. } => "chat",
        }
    }
}

// ---------------------------------------------------------------------------
// StateSnapshot: the per-player view
// ---------------------------------------------------------------------------

/// One row of the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: PlayerName,
    pub score: u32,
}

/// The game as one particular player is allowed to see it.
///
/// Every player receives the scoreboard, the judge, the prompt, and their
/// own hand. Only the judge gets `submissions`, and only once at least one
/// card has been played; for everyone else the field is absent from the
/// JSON entirely (`skip_serializing_if`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// All players in rotation order.
    pub players: Vec<PlayerSummary>,

    /// The current judge, absent before the first round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge: Option<PlayerName>,

    /// The prompt for the round in progress.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black_card: Option<PromptCard>,

    /// The recipient's own hand, in display order.
    pub hand: Vec<ResponseCard>,

    /// `true` while a round is in progress.
    pub started: bool,

    /// `true` once every non-judge player has played a card.
    #[serde(default)]
    pub ready: bool,

    /// Judge-only: who played what this round.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submissions: Option<BTreeMap<PlayerName, ResponseCard>>,
}

// ---------------------------------------------------------------------------
// ServerMessage: outbound frames
// ---------------------------------------------------------------------------

/// Everything the server pushes to a client.
///
/// Tagged by `"type"`: `{"type":"state", ...snapshot fields...}`,
/// `{"type":"error","code":409,"message":"..."}` and so on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A fresh view of the game for this recipient.
    State(StateSnapshot),

    /// Sent to a connection right after its join succeeded.
    Joined { room: RoomName, name: PlayerName },

    /// Announced to the room when the judge picks a winner.
    RoundResult {
        winner: PlayerName,
        card: ResponseCard,
        black_card: PromptCard,
    },

    /// A chat line relayed to everyone in the room, sender included.
    Chat { from: PlayerName, text: String },

    /// A rejected join or a protocol violation. `code` follows HTTP
    /// conventions: 400 bad request, 403 room full, 409 conflict.
    Error { code: u16, message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these exact JSON shapes, so the tests pin
    //! the field and tag names rather than only checking round trips.

    use super::*;

    fn name(s: &str) -> PlayerName {
        PlayerName::new(s)
    }

    #[test]
    fn test_player_name_serializes_as_plain_string() {
        let json = serde_json::to_string(&name("Ana")).unwrap();
        assert_eq!(json, "\"Ana\"");
    }

    #[test]
    fn test_join_json_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"action":"join","room":"R1","name":"Ana"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Join {
                room: RoomName::new("R1"),
                name: name("Ana"),
            }
        );
    }

    #[test]
    fn test_start_game_has_no_fields() {
        let msg: ClientMessage = serde_json::from_str(r#"{"action":"start_game"}"#).unwrap();
        assert_eq!(msg, ClientMessage::StartGame);
        assert_eq!(msg.kind(), "start_game");
    }

    #[test]
    fn test_choose_winner_json_format() {
        let json = serde_json::to_value(ClientMessage::ChooseWinner { player: name("Bo") }).unwrap();
        assert_eq!(json["action"], "choose_winner");
        assert_eq!(json["player"], "Bo");
    }

    #[test]
    fn test_play_card_rejects_negative_index() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"action":"play_card","index":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_play_card_requires_index() {
        let result: Result<ClientMessage, _> = serde_json::from_str(r#"{"action":"play_card"}"#);
        assert!(result.is_err());
    }

    fn player_view() -> StateSnapshot {
        StateSnapshot {
            players: vec![
                PlayerSummary { name: name("A"), score: 0 },
                PlayerSummary { name: name("B"), score: 2 },
            ],
            judge: Some(name("A")),
            black_card: Some(PromptCard::new("Why am I sticky? ____.")),
            hand: vec![ResponseCard::new("A lifetime of sadness.")],
            started: true,
            ready: false,
            submissions: None,
        }
    }

    #[test]
    fn test_state_snapshot_json_format() {
        let json = serde_json::to_value(ServerMessage::State(player_view())).unwrap();

        assert_eq!(json["type"], "state");
        assert_eq!(json["players"][1]["name"], "B");
        assert_eq!(json["players"][1]["score"], 2);
        assert_eq!(json["judge"], "A");
        assert_eq!(json["black_card"], "Why am I sticky? ____.");
        assert_eq!(json["hand"][0], "A lifetime of sadness.");
        assert_eq!(json["started"], true);
    }

    #[test]
    fn test_non_judge_snapshot_omits_submissions_field() {
        let json = serde_json::to_value(ServerMessage::State(player_view())).unwrap();
        assert!(json.get("submissions").is_none());
    }

    #[test]
    fn test_snapshot_before_start_omits_judge_and_prompt() {
        let snapshot = StateSnapshot {
            judge: None,
            black_card: None,
            started: false,
            ..player_view()
        };
        let json = serde_json::to_value(ServerMessage::State(snapshot)).unwrap();
        assert!(json.get("judge").is_none());
        assert!(json.get("black_card").is_none());
        assert_eq!(json["started"], false);
    }

    #[test]
    fn test_judge_snapshot_round_trip_keeps_submissions() {
        let mut submissions = BTreeMap::new();
        submissions.insert(name("B"), ResponseCard::new("Bees? \"BEES\"!"));
        submissions.insert(name("C"), ResponseCard::new("Ünïcödé & <tags>"));
        let snapshot = StateSnapshot {
            hand: Vec::new(),
            ready: true,
            submissions: Some(submissions.clone()),
            ..player_view()
        };

        let frame = serde_json::to_string(&ServerMessage::State(snapshot.clone())).unwrap();
        let decoded: ServerMessage = serde_json::from_str(&frame).unwrap();

        match decoded {
            ServerMessage::State(view) => {
                assert_eq!(view.submissions, Some(submissions));
                assert_eq!(view, snapshot);
            }
            other => panic!("expected state, got {other:?}"),
        }
    }

    #[test]
    fn test_round_result_json_format() {
        let json = serde_json::to_value(ServerMessage::RoundResult {
            winner: name("B"),
            card: ResponseCard::new("X"),
            black_card: PromptCard::new("P1"),
        })
        .unwrap();
        assert_eq!(json["type"], "round_result");
        assert_eq!(json["winner"], "B");
        assert_eq!(json["card"], "X");
        assert_eq!(json["black_card"], "P1");
    }

    #[test]
    fn test_joined_json_format() {
        let json = serde_json::to_value(ServerMessage::Joined {
            room: RoomName::new("R1"),
            name: name("Ana"),
        })
        .unwrap();
        assert_eq!(json["type"], "joined");
        assert_eq!(json["room"], "R1");
    }
}
