use alloc::string::String;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Token index {index} is out of range")]
    InvalidIndex { index: usize },
    #[error("Deck does not hold exactly two hidden tokens with the same face per pair id")]
    InvalidDeck,
    #[error("Random source failed: {0}")]
    RandomSource(String),
}

pub type Result<T> = core::result::Result<T, GameError>;
