//! The round state machine.
//!
//! ```text
//! NotStarted ──start()──→ RoundInProgress ──choose_winner()──→ RoundInProgress
//!                                │                                  │
//!                                └──── prompt deck empty ──→ Finished ←┘
//! ```
//!
//! Each round: draw a prompt, top every hand up, collect one card from every
//! player except the judge, let the judge pick a winner, rotate the judge.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use partycards_protocol::{PlayerName, PromptCard, ResponseCard};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{CardPool, Deck, GameConfig, GameError, Player};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Players are gathering; no cards dealt.
    NotStarted,
    /// A prompt is out and cards are being played or judged.
    RoundInProgress,
    /// The prompt deck ran out. Terminal.
    Finished,
}

impl Phase {
    /// `true` exactly while a round is in progress.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::RoundInProgress)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::RoundInProgress => write!(f, "RoundInProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

/// What happened when the judge picked a winner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    pub winner: PlayerName,
    pub card: ResponseCard,
    pub prompt: PromptCard,
}

/// What happened when a player left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Removal {
    /// The player was judging the round in progress.
    pub was_judge: bool,
    /// The round was abandoned and a new one dealt.
    pub round_voided: bool,
}

/// One game: the players of a room, their decks, and the current round.
#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    pool: Arc<CardPool>,
    /// Rotation order; `judge_index` points into it.
    players: Vec<Player>,
    judge_index: usize,
    prompt_deck: Deck<PromptCard>,
    response_deck: Deck<ResponseCard>,
    current_prompt: Option<PromptCard>,
    submissions: BTreeMap<PlayerName, ResponseCard>,
    phase: Phase,
}

impl GameSession {
    /// An empty session that will deal from `pool` once started.
    pub fn new(pool: Arc<CardPool>, config: GameConfig) -> Self {
        Self {
            config,
            pool,
            players: Vec::new(),
            judge_index: 0,
            prompt_deck: Deck::empty(),
            response_deck: Deck::empty(),
            current_prompt: None,
            submissions: BTreeMap::new(),
            phase: Phase::NotStarted,
        }
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    /// Seats a new player at the end of the rotation.
    ///
    /// A player arriving mid-round is dealt in at once and is expected to
    /// play a card this round.
    pub fn add_player(&mut self, name: PlayerName) -> Result<(), GameError> {
        if self.position(&name).is_some() {
            return Err(GameError::DuplicateIdentity(name));
        }

        let mut player = Player::new(name);
        if self.phase.is_started() {
            player.top_up(&mut self.response_deck, self.config.hand_size);
        }
        tracing::debug!(player = %player.name(), phase = %self.phase, "player seated");
        self.players.push(player);
        Ok(())
    }

    /// Removes a player and keeps the judge pointer on the same person.
    ///
    /// If the departing player was judging a round in progress, the round
    /// is voided: played cards go back to their owners, the next player in
    /// rotation becomes judge, and a fresh prompt is drawn.
    pub fn remove_player(&mut self, name: &PlayerName) -> Result<Removal, GameError> {
        let index = self
            .position(name)
            .ok_or_else(|| GameError::UnknownPlayer(name.clone()))?;

        let was_judge = self.phase.is_started() && index == self.judge_index;
        self.players.remove(index);
        self.submissions.remove(name);

        if index < self.judge_index {
            self.judge_index -= 1;
        }
        if self.players.is_empty() {
            self.judge_index = 0;
        } else {
            self.judge_index %= self.players.len();
        }

        let round_voided = was_judge && !self.players.is_empty();
        if round_voided {
            self.refund_submissions();
            self.advance_round();
            tracing::debug!(player = %name, "judge left, round voided");
        } else if !self.players.is_empty() {
            self.finish_if_unplayable();
        }

        Ok(Removal {
            was_judge,
            round_voided,
        })
    }

    // -----------------------------------------------------------------------
    // Round lifecycle
    // -----------------------------------------------------------------------

    /// Starts the game with a thread-local RNG.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.start_with(&mut rand::rng())
    }

    /// Shuffles fresh decks, deals every hand, and opens the first round.
    pub fn start_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), GameError> {
        if self.phase != Phase::NotStarted {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.len() < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.config.min_players,
                have: self.players.len(),
            });
        }

        self.prompt_deck = Deck::shuffled(self.pool.prompts(), rng);
        self.response_deck = Deck::shuffled(self.pool.responses(), rng);
        self.judge_index = 0;
        self.deal();
        self.advance_round();

        tracing::debug!(
            players = self.players.len(),
            prompts = self.prompt_deck.len() + 1,
            "decks shuffled, first round dealt"
        );
        Ok(())
    }

    /// Plays the card at `card_index` from `name`'s hand into this round.
    pub fn submit(&mut self, name: &PlayerName, card_index: usize) -> Result<(), GameError> {
        if !self.phase.is_started() {
            return Err(GameError::NotInProgress);
        }
        let index = self
            .position(name)
            .ok_or_else(|| GameError::UnknownPlayer(name.clone()))?;
        if index == self.judge_index {
            return Err(GameError::JudgeCannotSubmit);
        }
        if self.submissions.contains_key(name) {
            return Err(GameError::AlreadySubmitted(name.clone()));
        }

        let player = &mut self.players[index];
        let hand_size = player.hand().len();
        let card = player
            .take_card(card_index)
            .ok_or(GameError::InvalidCardIndex {
                index: card_index,
                hand_size,
            })?;
        self.submissions.insert(name.clone(), card);
        Ok(())
    }

    /// `true` once every player present who can play, other than the judge,
    /// has played.
    ///
    /// Counted against the live roster so a player leaving mid-round never
    /// leaves the round waiting on them. A player left with an empty hand by
    /// a dry response deck sits the round out.
    pub fn is_ready_to_judge(&self) -> bool {
        if !self.phase.is_started() {
            return false;
        }
        let mut waiting_on = self
            .players
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != self.judge_index)
            .filter(|(_, p)| !p.hand().is_empty() || self.submissions.contains_key(p.name()))
            .map(|(_, p)| p.name())
            .peekable();
        waiting_on.peek().is_some() && waiting_on.all(|name| self.submissions.contains_key(name))
    }

    /// The judge picks the winning card. Scores a point, rotates the judge,
    /// and opens the next round (or finishes the game).
    pub fn choose_winner(
        &mut self,
        judge: &PlayerName,
        winner: &PlayerName,
    ) -> Result<RoundOutcome, GameError> {
        if !self.phase.is_started() {
            return Err(GameError::NotInProgress);
        }
        if self.judge() != Some(judge) {
            return Err(GameError::NotJudge(judge.clone()));
        }
        if !self.is_ready_to_judge() {
            return Err(GameError::NotReady);
        }
        let card = self
            .submissions
            .get(winner)
            .cloned()
            .ok_or_else(|| GameError::NoSubmission(winner.clone()))?;
        let index = self
            .position(winner)
            .ok_or_else(|| GameError::UnknownPlayer(winner.clone()))?;
        let prompt = self.current_prompt.clone().ok_or(GameError::NotInProgress)?;

        self.players[index].award_point();
        self.judge_index = (self.judge_index + 1) % self.players.len();
        self.advance_round();

        tracing::debug!(%winner, score = self.players[index].score(), "point awarded");
        Ok(RoundOutcome {
            winner: winner.clone(),
            card,
            prompt,
        })
    }

    /// Clears the table and draws the next prompt, or finishes the game
    /// when there is none.
    fn advance_round(&mut self) {
        self.submissions.clear();
        match self.prompt_deck.draw() {
            Ok(prompt) => {
                self.current_prompt = Some(prompt);
                self.phase = Phase::RoundInProgress;
                self.deal();
                self.finish_if_unplayable();
            }
            Err(_) => {
                self.current_prompt = None;
                self.phase = Phase::Finished;
                tracing::debug!("prompt deck exhausted, game finished");
            }
        }
    }

    /// Ends the game when the response deck is dry, nothing is in play, and
    /// no one but the judge holds a card. No round could be judged again.
    fn finish_if_unplayable(&mut self) {
        if !self.phase.is_started() || !self.submissions.is_empty() || !self.response_deck.is_empty() {
            return;
        }
        let playable = self
            .players
            .iter()
            .enumerate()
            .any(|(i, p)| i != self.judge_index && !p.hand().is_empty());
        if !playable {
            self.current_prompt = None;
            self.phase = Phase::Finished;
            tracing::debug!("no playable hands left, game finished");
        }
    }

    /// Tops every hand up; short hands are fine once the deck is dry.
    fn deal(&mut self) {
        for player in &mut self.players {
            player.top_up(&mut self.response_deck, self.config.hand_size);
        }
    }

    fn refund_submissions(&mut self) {
        for (name, card) in std::mem::take(&mut self.submissions) {
            if let Some(player) = self.players.iter_mut().find(|p| p.name() == &name) {
                player.return_card(card);
            }
        }
    }

    fn position(&self, name: &PlayerName) -> Option<usize> {
        self.players.iter().position(|p| p.name() == name)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_started(&self) -> bool {
        self.phase.is_started()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Players in rotation order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, name: &PlayerName) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// The judge of the round in progress.
    pub fn judge(&self) -> Option<&PlayerName> {
        if !self.phase.is_started() {
            return None;
        }
        self.players.get(self.judge_index).map(Player::name)
    }

    pub fn current_prompt(&self) -> Option<&PromptCard> {
        self.current_prompt.as_ref()
    }

    /// Cards played this round, by player.
    pub fn submissions(&self) -> &BTreeMap<PlayerName, ResponseCard> {
        &self.submissions
    }

    pub fn prompts_remaining(&self) -> usize {
        self.prompt_deck.len()
    }

    pub fn responses_remaining(&self) -> usize {
        self.response_deck.len()
    }
}
