#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

use core::ops::Index;
use core::time::Duration;
use serde::{Deserialize, Serialize};

#[cfg(feature = "std")]
pub use driver::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use session::*;
pub use timer::*;
pub use token::*;
pub use types::*;

#[cfg(feature = "std")]
mod driver;
mod engine;
mod error;
mod generator;
mod session;
mod timer;
mod token;
mod types;

/// Delays of the two resolution sequences.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timing {
    /// From match detection to input unlock.
    pub match_hold: Duration,
    /// From mismatch detection to hiding the pair.
    pub mismatch_hide: Duration,
    /// From hiding the pair to input unlock.
    pub mismatch_unlock: Duration,
}

impl Timing {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

    pub const fn uniform(delay: Duration) -> Self {
        Self {
            match_hold: delay,
            mismatch_hide: delay,
            mismatch_unlock: delay,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT_DELAY)
    }
}

/// Deserializes through [`Deck::from_tokens`], so a stored deck obeys the same pairing rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Token; DECK_SIZE]", into = "[Token; DECK_SIZE]")]
pub struct Deck {
    tokens: [Token; DECK_SIZE],
}

impl Deck {
    /// Unshuffled deck, both copies of each pair next to each other.
    pub fn canonical() -> Self {
        Self {
            tokens: core::array::from_fn(|slot| Token::canonical_unchecked((slot / 2) as PairId)),
        }
    }

    /// Builds a deck laid out by pair id, each id getting its canonical face.
    pub fn from_pair_ids(ids: [PairId; DECK_SIZE]) -> Result<Self> {
        let mut tokens = [Token::canonical_unchecked(0); DECK_SIZE];
        for (token, id) in tokens.iter_mut().zip(ids) {
            *token = Token::canonical(id).ok_or(GameError::InvalidDeck)?;
        }
        Self::from_tokens(tokens)
    }

    /// Validates a hand-built deck: every id appears on exactly two hidden tokens sharing one face.
    pub fn from_tokens(tokens: [Token; DECK_SIZE]) -> Result<Self> {
        let mut seen: [Option<(usize, Token)>; PAIR_COUNT] = [None; PAIR_COUNT];

        for token in &tokens {
            if token.is_revealed() {
                return Err(GameError::InvalidDeck);
            }
            let entry = seen
                .get_mut(usize::from(token.id()))
                .ok_or(GameError::InvalidDeck)?;
            match *entry {
                None => *entry = Some((1, *token)),
                Some((1, first)) if first.matches(token) => *entry = Some((2, first)),
                Some(_) => return Err(GameError::InvalidDeck),
            }
        }

        if seen.iter().all(|entry| matches!(entry, Some((2, _)))) {
            Ok(Self { tokens })
        } else {
            Err(GameError::InvalidDeck)
        }
    }

    pub fn validate_index(&self, index: usize) -> Result<SlotIndex> {
        if index < self.tokens.len() {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex { index })
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn revealed_count(&self) -> usize {
        self.tokens.iter().filter(|token| token.is_revealed()).count()
    }

    pub fn is_fully_revealed(&self) -> bool {
        self.tokens.iter().all(Token::is_revealed)
    }

    pub(crate) fn tokens_mut(&mut self) -> &mut [Token] {
        &mut self.tokens
    }

    pub(crate) fn set_revealed(&mut self, slot: SlotIndex, revealed: bool) {
        self.tokens[slot].set_revealed(revealed);
    }
}

impl TryFrom<[Token; DECK_SIZE]> for Deck {
    type Error = GameError;

    fn try_from(tokens: [Token; DECK_SIZE]) -> Result<Self> {
        Self::from_tokens(tokens)
    }
}

impl From<Deck> for [Token; DECK_SIZE] {
    fn from(deck: Deck) -> Self {
        deck.tokens
    }
}

impl Index<SlotIndex> for Deck {
    type Output = Token;

    fn index(&self, slot: SlotIndex) -> &Self::Output {
        &self.tokens[slot]
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    NoChange,
    Revealed,
    Matched,
    Mismatched,
    Completed,
}

impl SelectOutcome {
    pub const fn has_update(self) -> bool {
        use SelectOutcome::*;
        match self {
            NoChange => false,
            Revealed => true,
            Matched => true,
            Mismatched => true,
            Completed => true,
        }
    }

    /// Whether this selection closed a turn and counted as an attempt.
    pub const fn is_attempt(self) -> bool {
        matches!(self, Self::Matched | Self::Mismatched | Self::Completed)
    }
}
