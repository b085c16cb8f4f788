use serde::{Deserialize, Serialize};

use crate::*;

/// One tile of the deck. Two tokens share each pair id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    id: PairId,
    shape: Shape,
    color: Color,
    revealed: bool,
}

impl Token {
    pub const fn new(id: PairId, shape: Shape, color: Color) -> Self {
        Self {
            id,
            shape,
            color,
            revealed: false,
        }
    }

    /// Face assigned to `id` in a generated deck: shape cycles fastest, color advances every three ids.
    pub const fn canonical(id: PairId) -> Option<Self> {
        if (id as usize) < PAIR_COUNT {
            Some(Self::canonical_unchecked(id))
        } else {
            None
        }
    }

    pub(crate) const fn canonical_unchecked(id: PairId) -> Self {
        let index = id as usize;
        Self::new(
            id,
            Shape::ALL[index % Shape::ALL.len()],
            Color::ALL[index / Color::ALL.len()],
        )
    }

    pub const fn id(&self) -> PairId {
        self.id
    }

    pub const fn shape(&self) -> Shape {
        self.shape
    }

    pub const fn color(&self) -> Color {
        self.color
    }

    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Tokens match on their face, the pair id is informational.
    pub fn matches(&self, other: &Self) -> bool {
        self.shape == other.shape && self.color == other.color
    }

    pub const fn view(&self) -> TokenView {
        TokenView {
            shape: self.shape,
            color: self.color,
            revealed: self.revealed,
        }
    }

    pub(crate) fn set_revealed(&mut self, revealed: bool) {
        self.revealed = revealed;
    }
}

/// What a renderer needs to draw one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenView {
    pub shape: Shape,
    pub color: Color,
    pub revealed: bool,
}
