use core::fmt;
use serde::{Deserialize, Serialize};

/// Position of a token in the deck, row-major over the grid.
pub type SlotIndex = usize;

/// Pairing key shared by the two tokens of a pair.
pub type PairId = u8;

/// Logical game generation within a session, bumped on every new game.
pub type Generation = u64;

pub const GRID_COLUMNS: usize = 4;
pub const GRID_ROWS: usize = 4;
pub const DECK_SIZE: usize = GRID_COLUMNS * GRID_ROWS;
pub const PAIR_COUNT: usize = DECK_SIZE / 2;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

impl Shape {
    pub const ALL: [Self; 3] = [Self::Circle, Self::Square, Self::Triangle];

    pub const fn name(self) -> &'static str {
        use Shape::*;
        match self {
            Circle => "circle",
            Square => "square",
            Triangle => "triangle",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    pub const fn name(self) -> &'static str {
        use Color::*;
        match self {
            Red => "red",
            Green => "green",
            Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub trait ToGridIndex {
    fn to_grid_index(self) -> (usize, usize);
}

impl ToGridIndex for SlotIndex {
    /// `(row, column)` of a slot on the 4x4 board.
    fn to_grid_index(self) -> (usize, usize) {
        (self / GRID_COLUMNS, self % GRID_COLUMNS)
    }
}

pub const fn grid_to_slot(row: usize, column: usize) -> SlotIndex {
    row * GRID_COLUMNS + column
}
