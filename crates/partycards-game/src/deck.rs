//! Card pools and draw piles.
//!
//! A [`CardPool`] is loaded once per server and shared by every room. Each
//! game shuffles its own [`Deck`]s out of it, so two rooms never draw from
//! the same pile and a pile is never refilled: when the prompts run out,
//! the game is over.

use std::collections::HashSet;

use partycards_protocol::{PromptCard, ResponseCard};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

use crate::{CardPoolError, DeckError};

// ---------------------------------------------------------------------------
// CardPool
// ---------------------------------------------------------------------------

/// The full, immutable card content: one pool of prompts, one of responses.
#[derive(Debug, Clone)]
pub struct CardPool {
    prompts: Vec<PromptCard>,
    responses: Vec<ResponseCard>,
}

/// On-disk card file layout.
#[derive(Deserialize)]
struct CardFile {
    prompts: Vec<String>,
    responses: Vec<String>,
}

impl CardPool {
    /// Builds a pool from raw card text.
    ///
    /// Blank cards are dropped and repeated text keeps only its first
    /// occurrence, so a hand can never hold two identical cards.
    ///
    /// # Errors
    /// [`CardPoolError::NoPrompts`] / [`CardPoolError::NoResponses`] when a
    /// pool ends up empty.
    pub fn new<P, R>(prompts: P, responses: R) -> Result<Self, CardPoolError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let prompts: Vec<PromptCard> = unique_texts(prompts)
            .into_iter()
            .map(PromptCard::new)
            .collect();
        let responses: Vec<ResponseCard> = unique_texts(responses)
            .into_iter()
            .map(ResponseCard::new)
            .collect();

        if prompts.is_empty() {
            return Err(CardPoolError::NoPrompts);
        }
        if responses.is_empty() {
            return Err(CardPoolError::NoResponses);
        }
        Ok(Self { prompts, responses })
    }

    /// Parses a `{"prompts": [...], "responses": [...]}` JSON document.
    pub fn from_json(json: &str) -> Result<Self, CardPoolError> {
        let file: CardFile = serde_json::from_str(json)?;
        Self::new(file.prompts, file.responses)
    }

    /// A small starter set, enough for a handful of players to try a game.
    pub fn builtin() -> Self {
        Self {
            prompts: BUILTIN_PROMPTS.iter().copied().map(PromptCard::new).collect(),
            responses: BUILTIN_RESPONSES
                .iter()
                .copied()
                .map(ResponseCard::new)
                .collect(),
        }
    }

    pub fn prompts(&self) -> &[PromptCard] {
        &self.prompts
    }

    pub fn responses(&self) -> &[ResponseCard] {
        &self.responses
    }
}

fn unique_texts<I>(texts: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut seen = HashSet::new();
    texts
        .into_iter()
        .map(Into::into)
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty() && seen.insert(text.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Deck
// ---------------------------------------------------------------------------

/// A draw pile. Cards come off the end.
#[derive(Debug, Clone)]
pub struct Deck<C> {
    pile: Vec<C>,
}

impl<C: Clone> Deck<C> {
    /// Every card of `pool` exactly once, uniformly shuffled.
    pub fn shuffled<R: Rng + ?Sized>(pool: &[C], rng: &mut R) -> Self {
        let mut pile = pool.to_vec();
        pile.shuffle(rng);
        Self { pile }
    }
}

impl<C> Deck<C> {
    /// A pile with nothing in it; what a session holds before it starts.
    pub fn empty() -> Self {
        Self { pile: Vec::new() }
    }

    /// Removes and returns the top card.
    pub fn draw(&mut self) -> Result<C, DeckError> {
        self.pile.pop().ok_or(DeckError::Exhausted)
    }

    pub fn len(&self) -> usize {
        self.pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pile.is_empty()
    }
}

impl<C> Default for Deck<C> {
    fn default() -> Self {
        Self::empty()
    }
}

const BUILTIN_PROMPTS: &[&str] = &[
    "What's that smell? ____.",
    "My therapist says I need to stop ____.",
    "The secret ingredient in grandma's soup is ____.",
    "Next on the nature documentary: ____.",
    "I got kicked out of the library for ____.",
    "The real reason dinosaurs went extinct: ____.",
    "What did I bring back from vacation? ____.",
    "Coming soon to theaters: ____, the musical.",
    "My superpower is ____, but only on Tuesdays.",
    "What keeps the office printer running? ____.",
    "The wedding was going great until ____.",
    "Scientists have finally explained ____.",
];

const BUILTIN_RESPONSES: &[&str] = &[
    "A suspiciously large spoon.",
    "Forty raccoons in a trench coat.",
    "Aggressive jazz hands.",
    "The last slice of pizza.",
    "A haunted spreadsheet.",
    "Interpretive dance.",
    "My collection of novelty socks.",
    "An unsupervised toddler with a drum kit.",
    "Crying in the cereal aisle.",
    "A motivational goose.",
    "Three bees and a grudge.",
    "Accidentally replying all.",
    "A very confident pigeon.",
    "Tax season.",
    "The group chat.",
    "Yelling at clouds.",
    "A lukewarm bath.",
    "Emotional support cheese.",
    "Karaoke gone wrong.",
    "A sentient vending machine.",
    "The neighbor's leaf blower at 7 a.m.",
    "Glitter. Everywhere.",
    "An unexpected plot twist.",
    "My browser history.",
    "A pirate with a fear of water.",
    "Socks with sandals.",
    "Pretending to understand wine.",
    "The final boss of customer service.",
    "A disappointing magic trick.",
    "Mild peril.",
    "Doing taxes in a bathtub.",
    "A mysterious hum coming from the fridge.",
    "Grandpa's conspiracy theories.",
    "An ill-advised tattoo.",
    "Speed-walking competitively.",
    "A llama with a law degree.",
    "Microwave popcorn at work.",
    "The Wi-Fi password.",
    "A sad trombone.",
    "Overly enthusiastic mimes.",
    "A dramatic exit.",
    "Unlimited breadsticks.",
    "The concept of Mondays.",
    "A tiny hat for a cat.",
    "Existential dread.",
    "A surprise audit.",
    "Reheated fish in the office microwave.",
    "An escape room with no exit.",
    "Moonwalking away from responsibility.",
    "Elevator small talk.",
    "A bouncy castle in a thunderstorm.",
    "Soup, but cold.",
    "A parade of one.",
    "Too many browser tabs.",
    "Someone else's baby photos.",
    "A fog machine.",
];
