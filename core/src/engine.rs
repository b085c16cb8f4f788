use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Slots flipped face-up in the current turn, at most two.
pub type Selection = SmallVec<[SlotIndex; 2]>;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnState {
    #[default]
    Idle,
    Evaluating,
    Complete,
}

impl TurnState {
    pub const fn accepts_input(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Read-only view handed to renderers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tokens: [TokenView; DECK_SIZE],
    pub attempts: u32,
    pub input_locked: bool,
    pub complete: bool,
}

impl Snapshot {
    /// Tokens laid out as `GRID_ROWS` x `GRID_COLUMNS`, indexed `[row, column]`.
    pub fn grid(&self) -> Array2<TokenView> {
        Array2::from_shape_fn((GRID_ROWS, GRID_COLUMNS), |(row, column)| {
            self.tokens[grid_to_slot(row, column)]
        })
    }
}

/// Rules of one game: selection, match evaluation and the effects of fired timers.
///
/// Serializable for debugging, but only ever rebuilt from a validated [`Deck`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchEngine {
    deck: Deck,
    selection: Selection,
    attempts: u32,
    input_locked: bool,
}

impl MatchEngine {
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            selection: Selection::new(),
            attempts: 0,
            input_locked: false,
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn selection(&self) -> &[SlotIndex] {
        &self.selection
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    pub fn is_complete(&self) -> bool {
        self.deck.is_fully_revealed()
    }

    pub fn turn_state(&self) -> TurnState {
        if self.is_complete() {
            TurnState::Complete
        } else if self.input_locked {
            TurnState::Evaluating
        } else {
            TurnState::Idle
        }
    }

    pub fn can_select(&self, slot: SlotIndex) -> bool {
        !self.input_locked && self.selection.len() < 2 && !self.deck[slot].is_revealed()
    }

    pub fn select_token(&mut self, index: usize) -> Result<SelectOutcome> {
        let slot = self.deck.validate_index(index)?;

        if !self.can_select(slot) {
            log::trace!(
                "ignored selection of {} (locked: {}, revealed: {})",
                slot,
                self.input_locked,
                self.deck[slot].is_revealed()
            );
            return Ok(SelectOutcome::NoChange);
        }

        self.deck.set_revealed(slot, true);
        self.selection.push(slot);
        log::trace!("revealed {}", slot);

        let &[first, second] = self.selection.as_slice() else {
            return Ok(SelectOutcome::Revealed);
        };
        Ok(self.evaluate(first, second))
    }

    fn evaluate(&mut self, first: SlotIndex, second: SlotIndex) -> SelectOutcome {
        self.attempts = self.attempts.saturating_add(1);
        self.input_locked = true;

        if !self.deck[first].matches(&self.deck[second]) {
            log::debug!("mismatch: {} / {} (attempt {})", first, second, self.attempts);
            return SelectOutcome::Mismatched;
        }

        self.selection.clear();
        if self.is_complete() {
            log::debug!("completed in {} attempts", self.attempts);
            SelectOutcome::Completed
        } else {
            let token = self.deck[first];
            log::debug!(
                "match: {} / {} ({} {}, attempt {})",
                first,
                second,
                token.color(),
                token.shape(),
                self.attempts
            );
            SelectOutcome::Matched
        }
    }

    /// Applies a fired timer, returning whether anything changed.
    pub fn apply(&mut self, event: TimerEvent) -> bool {
        use TimerEvent::*;

        match event {
            ReleaseMatch | ReleaseMismatch => core::mem::replace(&mut self.input_locked, false),
            HideMismatch { first, second } => {
                if self.selection.as_slice() != [first, second] {
                    return false;
                }
                self.deck.set_revealed(first, false);
                self.deck.set_revealed(second, false);
                self.selection.clear();
                true
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tokens: core::array::from_fn(|slot| self.deck[slot].view()),
            attempts: self.attempts,
            input_locked: self.input_locked,
            complete: self.is_complete(),
        }
    }
}
