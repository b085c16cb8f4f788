use crate::*;
pub use random::*;

mod random;

pub trait DeckGenerator {
    /// Produces a fresh deck of hidden tokens. A failure leaves nothing half-built.
    fn generate(&mut self) -> Result<Deck>;
}
