//! A seat at the table.

use partycards_protocol::{PlayerName, ResponseCard};

use crate::Deck;

/// One player in a game session: who they are, what they hold, how many
/// rounds they have won.
#[derive(Debug, Clone)]
pub struct Player {
    name: PlayerName,
    hand: Vec<ResponseCard>,
    score: u32,
}

impl Player {
    /// A new player with an empty hand and no points.
    pub fn new(name: PlayerName) -> Self {
        Self {
            name,
            hand: Vec::new(),
            score: 0,
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    /// The hand in display order.
    pub fn hand(&self) -> &[ResponseCard] {
        &self.hand
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Draws until the hand holds `size` cards or the deck runs dry.
    ///
    /// Returns how many cards were drawn.
    pub(crate) fn top_up(&mut self, deck: &mut Deck<ResponseCard>, size: usize) -> usize {
        let mut drawn = 0;
        while self.hand.len() < size {
            match deck.draw() {
                Ok(card) => {
                    self.hand.push(card);
                    drawn += 1;
                }
                Err(_) => break,
            }
        }
        drawn
    }

    /// Removes the card at `index`, shifting later cards left.
    pub(crate) fn take_card(&mut self, index: usize) -> Option<ResponseCard> {
        (index < self.hand.len()).then(|| self.hand.remove(index))
    }

    /// Puts a previously played card back (voided round).
    pub(crate) fn return_card(&mut self, card: ResponseCard) {
        self.hand.push(card);
    }

    pub(crate) fn award_point(&mut self) {
        self.score += 1;
    }
}
