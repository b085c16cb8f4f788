use alloc::string::ToString;
use rand::rngs::SmallRng;
use rand::{SeedableRng, TryRngCore};

use super::*;

/// Generation strategy that lays out the canonical pairs and applies a uniform Fisher-Yates shuffle.
#[derive(Clone, Debug)]
pub struct RandomDeckGenerator<R = SmallRng> {
    rng: R,
}

impl RandomDeckGenerator<SmallRng> {
    pub fn from_seed(seed: u64) -> Self {
        log::debug!("deck seed: {}", seed);
        Self::new(SmallRng::seed_from_u64(seed))
    }

    #[cfg(feature = "std")]
    pub fn from_entropy() -> Result<Self> {
        SmallRng::try_from_os_rng()
            .map(Self::new)
            .map_err(|err| {
                log::warn!("OS random source unavailable: {}", err);
                GameError::RandomSource(err.to_string())
            })
    }
}

impl<R: TryRngCore> RandomDeckGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: TryRngCore> DeckGenerator for RandomDeckGenerator<R> {
    fn generate(&mut self) -> Result<Deck> {
        let mut deck = Deck::canonical();
        if let Err(err) = shuffle(deck.tokens_mut(), &mut self.rng) {
            log::warn!("deck generation aborted: {}", err);
            return Err(err);
        }
        Ok(deck)
    }
}

/// In-place Fisher-Yates shuffle, every permutation of `items` is equally likely.
pub fn shuffle<T, R: TryRngCore>(items: &mut [T], rng: &mut R) -> Result<()> {
    for i in (1..items.len()).rev() {
        let j = uniform_below(rng, (i + 1) as u64)? as usize;
        items.swap(i, j);
    }
    Ok(())
}

/// Uniform draw from `0..bound` by rejection sampling, so no residue class is favored.
pub(crate) fn uniform_below<R: TryRngCore>(rng: &mut R, bound: u64) -> Result<u64> {
    debug_assert!(bound > 0);
    // 2^64 mod bound: draws below it are the biased tail
    let threshold = bound.wrapping_neg() % bound;
    loop {
        let draw = rng
            .try_next_u64()
            .map_err(|err| GameError::RandomSource(err.to_string()))?;
        if draw >= threshold {
            return Ok(draw % bound);
        }
    }
}
