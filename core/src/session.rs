use core::time::Duration;
use rand::rngs::SmallRng;
use rand::TryRngCore;

use crate::*;

/// Owner of the live game. Player input and elapsed time are the only ways to change it.
///
/// Time is logical: [`Session::advance`] moves the clock and fires every due timer. Each timer is
/// tagged with the [`Generation`] of the game that scheduled it, and timers from a game discarded by
/// [`Session::new_game`] are dropped unapplied.
#[derive(Debug)]
pub struct Session<G = RandomDeckGenerator> {
    generator: G,
    engine: MatchEngine,
    generation: Generation,
    timers: TimerQueue,
    clock: Duration,
    timing: Timing,
}

impl Session<RandomDeckGenerator<SmallRng>> {
    pub fn from_seed(seed: u64) -> Result<Self> {
        Self::new(RandomDeckGenerator::from_seed(seed))
    }

    #[cfg(feature = "std")]
    pub fn from_entropy() -> Result<Self> {
        Self::new(RandomDeckGenerator::from_entropy()?)
    }
}

impl<R: TryRngCore> Session<RandomDeckGenerator<R>> {
    pub fn from_rng(rng: R) -> Result<Self> {
        Self::new(RandomDeckGenerator::new(rng))
    }
}

impl<G: DeckGenerator> Session<G> {
    pub fn new(generator: G) -> Result<Self> {
        Self::with_timing(generator, Timing::default())
    }

    pub fn with_timing(mut generator: G, timing: Timing) -> Result<Self> {
        let deck = generator.generate()?;
        Ok(Self::with_deck(generator, deck, timing))
    }

    /// Starts from a prepared deck; `generator` is only used by later new games.
    pub fn with_deck(generator: G, deck: Deck, timing: Timing) -> Self {
        log::debug!("session started");
        Self {
            generator,
            engine: MatchEngine::new(deck),
            generation: 0,
            timers: TimerQueue::new(),
            clock: Duration::ZERO,
            timing,
        }
    }

    pub fn select_token(&mut self, index: usize) -> Result<SelectOutcome> {
        use SelectOutcome::*;

        let outcome = self.engine.select_token(index)?;
        match outcome {
            NoChange | Revealed => {}
            Matched | Completed => self.schedule(self.timing.match_hold, TimerEvent::ReleaseMatch),
            Mismatched => {
                if let &[first, second] = self.engine.selection() {
                    let hide = self.timing.mismatch_hide;
                    self.schedule(hide, TimerEvent::HideMismatch { first, second });
                    self.schedule(
                        hide.saturating_add(self.timing.mismatch_unlock),
                        TimerEvent::ReleaseMismatch,
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Discards the current game. Timers it left pending never touch the new one.
    ///
    /// If the deck cannot be generated the current game is kept as is.
    pub fn new_game(&mut self) -> Result<()> {
        let deck = self.generator.generate()?;
        self.generation = self.generation.wrapping_add(1);
        self.engine = MatchEngine::new(deck);
        let purged = self.timers.retain_generation(self.generation);
        log::debug!(
            "new game (generation {}, {} stale timers purged)",
            self.generation,
            purged
        );
        Ok(())
    }

    /// Moves the clock forward and fires due timers in order, returning how many changed state.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        self.clock = self.clock.saturating_add(elapsed);

        let mut applied = 0;
        while let Some(scheduled) = self.timers.pop_due(self.clock) {
            if scheduled.generation != self.generation {
                log::debug!(
                    "dropped stale {:?} from generation {}",
                    scheduled.event,
                    scheduled.generation
                );
                continue;
            }

            log::trace!("fired {:?} at {:?}", scheduled.event, scheduled.due);
            if self.engine.apply(scheduled.event) {
                applied += 1;
            }
        }
        applied
    }

    /// Time left until the next pending timer, zero when one is already due.
    pub fn time_until_next_event(&self) -> Option<Duration> {
        self.timers
            .next_due()
            .map(|due| due.saturating_sub(self.clock))
    }

    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    pub fn attempts(&self) -> u32 {
        self.engine.attempts()
    }

    pub fn is_input_locked(&self) -> bool {
        self.engine.is_input_locked()
    }

    pub fn turn_state(&self) -> TurnState {
        self.engine.turn_state()
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Logical time since the session was created.
    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    fn schedule(&mut self, delay: Duration, event: TimerEvent) {
        let due = self.clock.saturating_add(delay);
        self.timers.schedule(due, self.generation, event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRAMBLED: [PairId; DECK_SIZE] = [0, 1, 2, 3, 4, 0, 5, 6, 7, 1, 2, 3, 4, 5, 6, 7];

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn session() -> Session {
        let deck = Deck::from_pair_ids(SCRAMBLED).unwrap();
        Session::with_deck(RandomDeckGenerator::from_seed(1), deck, Timing::default())
    }

    /// Deals the same deck again on the first new game.
    fn replaying_session() -> Session<OneShotGenerator> {
        let deck = Deck::from_pair_ids(SCRAMBLED).unwrap();
        Session::with_deck(OneShotGenerator(Some(deck.clone())), deck, Timing::default())
    }

    /// Hands out one good deck, then fails.
    #[derive(Debug)]
    struct OneShotGenerator(Option<Deck>);

    impl DeckGenerator for OneShotGenerator {
        fn generate(&mut self) -> Result<Deck> {
            self.0
                .take()
                .ok_or_else(|| GameError::RandomSource("drained".into()))
        }
    }

    #[test]
    fn matched_pair_unlocks_after_one_second() {
        let mut session = session();

        assert_eq!(session.select_token(0).unwrap(), SelectOutcome::Revealed);
        assert_eq!(session.select_token(5).unwrap(), SelectOutcome::Matched);

        let snapshot = session.snapshot();
        assert!(snapshot.tokens[0].revealed && snapshot.tokens[5].revealed);
        assert_eq!(snapshot.attempts, 1);
        assert!(snapshot.input_locked);
        assert_eq!(session.time_until_next_event(), Some(ms(1000)));

        assert_eq!(session.advance(ms(999)), 0);
        assert!(session.is_input_locked());
        assert_eq!(session.advance(ms(1)), 1);

        let snapshot = session.snapshot();
        assert!(!snapshot.input_locked);
        assert!(snapshot.tokens[0].revealed && snapshot.tokens[5].revealed);
        assert!(session.engine().selection().is_empty());
        assert_eq!(session.time_until_next_event(), None);
    }

    #[test]
    fn mismatched_pair_hides_then_unlocks() {
        let mut session = session();

        session.select_token(0).unwrap();
        assert_eq!(session.select_token(1).unwrap(), SelectOutcome::Mismatched);

        let snapshot = session.snapshot();
        assert!(snapshot.tokens[0].revealed && snapshot.tokens[1].revealed);
        assert_eq!(snapshot.attempts, 1);
        assert!(snapshot.input_locked);

        session.advance(ms(1000));
        let snapshot = session.snapshot();
        assert!(!snapshot.tokens[0].revealed && !snapshot.tokens[1].revealed);
        assert!(snapshot.input_locked);
        assert_eq!(session.time_until_next_event(), Some(ms(1000)));

        session.advance(ms(999));
        assert!(session.is_input_locked());
        session.advance(ms(1));
        assert!(!session.is_input_locked());
        assert_eq!(session.turn_state(), TurnState::Idle);
    }

    #[test]
    fn one_large_step_fires_the_whole_sequence() {
        let mut session = session();
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();

        assert_eq!(session.advance(ms(5000)), 2);

        let snapshot = session.snapshot();
        assert!(!snapshot.input_locked);
        assert!(!snapshot.tokens[0].revealed && !snapshot.tokens[1].revealed);
    }

    #[test]
    fn clicks_during_evaluation_are_ignored() {
        let mut session = session();
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();
        let before = session.snapshot();

        for index in [0, 1, 2, 5] {
            assert_eq!(session.select_token(index).unwrap(), SelectOutcome::NoChange);
        }
        assert_eq!(session.snapshot(), before);

        session.advance(ms(1500));
        assert_eq!(session.select_token(2).unwrap(), SelectOutcome::NoChange);

        assert_eq!(session.attempts(), before.attempts);
        assert!(session.engine().selection().is_empty());
        assert_eq!(session.time_until_next_event(), Some(ms(500)));
    }

    #[test]
    fn invalid_index_leaves_state_alone() {
        let mut session = session();
        session.select_token(0).unwrap();
        let before = session.snapshot();

        assert_eq!(
            session.select_token(16),
            Err(GameError::InvalidIndex { index: 16 })
        );
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.engine().selection(), &[0]);
    }

    #[test]
    fn attempts_count_every_completed_pair() {
        let mut session = session();

        // mismatch, match, mismatch
        for (first, second) in [(0, 1), (0, 5), (2, 3)] {
            session.select_token(first).unwrap();
            session.select_token(second).unwrap();
            session.advance(ms(2000));
        }

        assert_eq!(session.attempts(), 3);
        let snapshot = session.snapshot();
        assert!(snapshot.tokens[0].revealed && snapshot.tokens[5].revealed);
        assert!(!snapshot.tokens[2].revealed && !snapshot.tokens[3].revealed);
    }

    #[test]
    fn matched_pair_survives_later_mismatches() {
        let mut session = session();
        session.select_token(0).unwrap();
        session.select_token(5).unwrap();
        session.advance(ms(1000));

        for (first, second) in [(1, 2), (3, 4), (6, 7)] {
            session.select_token(first).unwrap();
            session.select_token(second).unwrap();
            session.advance(ms(2000));
            let snapshot = session.snapshot();
            assert!(snapshot.tokens[0].revealed && snapshot.tokens[5].revealed);
        }
    }

    #[test]
    fn full_game_completes_only_on_match() {
        let mut session = session();
        let slots_of = |id: PairId| {
            let mut slots = SCRAMBLED
                .iter()
                .enumerate()
                .filter(move |&(_, &pair)| pair == id)
                .map(|(slot, _)| slot);
            (slots.next().unwrap(), slots.next().unwrap())
        };

        // one mismatch up front never completes anything
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();
        session.advance(ms(2000));
        assert!(!session.is_complete());

        for id in 0..PAIR_COUNT as PairId {
            let (first, second) = slots_of(id);
            session.select_token(first).unwrap();
            let outcome = session.select_token(second).unwrap();
            assert!(outcome.is_attempt());
            if id + 1 == PAIR_COUNT as PairId {
                assert_eq!(outcome, SelectOutcome::Completed);
            } else {
                assert!(!session.is_complete());
            }
            session.advance(ms(1000));
        }

        assert!(session.is_complete());
        assert!(session.snapshot().complete);
        assert_eq!(session.attempts(), PAIR_COUNT as u32 + 1);
        assert_eq!(session.turn_state(), TurnState::Complete);
        assert_eq!(session.select_token(3).unwrap(), SelectOutcome::NoChange);
    }

    #[test]
    fn new_game_resets_everything() {
        let mut session = session();
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();

        session.new_game().unwrap();

        let fresh = session.snapshot();
        assert_eq!(session.generation(), 1);
        assert_eq!(fresh.attempts, 0);
        assert!(!fresh.input_locked);
        assert!(fresh.tokens.iter().all(|token| !token.revealed));
        assert!(session.engine().selection().is_empty());
    }

    #[test]
    fn new_game_clears_pending_deadlines() {
        let mut session = session();
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();
        assert_eq!(session.time_until_next_event(), Some(ms(1000)));

        session.new_game().unwrap();

        assert_eq!(session.time_until_next_event(), None);
        assert_eq!(session.advance(ms(5000)), 0);
    }

    #[test]
    fn stale_hide_does_not_touch_new_pair() {
        let mut session = replaying_session();
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();
        session.advance(ms(400));

        session.new_game().unwrap();
        assert_eq!(session.select_token(0).unwrap(), SelectOutcome::Revealed);
        assert_eq!(session.select_token(1).unwrap(), SelectOutcome::Mismatched);

        // the old game's hide comes due first and must be dropped
        assert_eq!(session.advance(ms(600)), 0);
        let snapshot = session.snapshot();
        assert!(snapshot.tokens[0].revealed && snapshot.tokens[1].revealed);
        assert!(snapshot.input_locked);

        assert_eq!(session.advance(ms(400)), 1);
        let snapshot = session.snapshot();
        assert!(!snapshot.tokens[0].revealed && !snapshot.tokens[1].revealed);
    }

    #[test]
    fn stale_unlock_does_not_release_new_lock() {
        let mut session = replaying_session();
        session.select_token(0).unwrap();
        session.select_token(1).unwrap();
        session.advance(ms(1500));

        session.new_game().unwrap();
        session.select_token(0).unwrap();
        assert_eq!(session.select_token(5).unwrap(), SelectOutcome::Matched);

        assert_eq!(session.advance(ms(500)), 0);
        assert!(session.is_input_locked());
        assert_eq!(session.advance(ms(500)), 1);
        assert!(!session.is_input_locked());
    }

    #[test]
    fn new_game_during_match_hold_keeps_new_game_unlocked() {
        let mut session = session();
        session.select_token(0).unwrap();
        session.select_token(5).unwrap();

        session.advance(ms(400));
        session.new_game().unwrap();
        session.select_token(3).unwrap();
        let before = session.snapshot();

        assert_eq!(session.advance(ms(600)), 0);
        assert_eq!(session.snapshot(), before);
        assert_eq!(session.engine().selection(), &[3]);
    }

    #[test]
    fn failed_new_game_keeps_current_game() {
        let deck = Deck::from_pair_ids(SCRAMBLED).unwrap();
        let mut session = Session::with_deck(OneShotGenerator(None), deck, Timing::default());
        session.select_token(0).unwrap();
        let before = session.snapshot();

        assert_eq!(
            session.new_game(),
            Err(GameError::RandomSource("drained".into()))
        );
        assert_eq!(session.generation(), 0);
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn constructor_surfaces_generator_failure() {
        let err = Session::new(OneShotGenerator(None)).unwrap_err();
        assert_eq!(err, GameError::RandomSource("drained".into()));
    }

    #[test]
    fn seeded_sessions_deal_identical_decks() {
        use rand::SeedableRng;

        let a = Session::from_seed(2024).unwrap();
        let b = Session::from_rng(SmallRng::seed_from_u64(2024)).unwrap();
        assert_eq!(a.engine().deck(), b.engine().deck());
    }

    #[test]
    fn custom_timing_is_respected() {
        let timing = Timing {
            match_hold: ms(300),
            mismatch_hide: ms(500),
            mismatch_unlock: ms(250),
        };
        let deck = Deck::from_pair_ids(SCRAMBLED).unwrap();
        let mut session = Session::with_deck(RandomDeckGenerator::from_seed(3), deck, timing);

        session.select_token(0).unwrap();
        session.select_token(1).unwrap();
        assert_eq!(session.time_until_next_event(), Some(ms(500)));
        session.advance(ms(500));
        assert!(!session.snapshot().tokens[0].revealed);
        assert_eq!(session.time_until_next_event(), Some(ms(250)));
        session.advance(ms(250));
        assert!(!session.is_input_locked());
        assert_eq!(session.elapsed(), ms(750));
    }

    #[test]
    fn snapshot_serializes_for_renderers() {
        let mut session = session();
        session.select_token(0).unwrap();

        let value = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(value["tokens"][0]["shape"], "Circle");
        assert_eq!(value["tokens"][0]["color"], "Red");
        assert_eq!(value["tokens"][0]["revealed"], true);
        assert_eq!(value["tokens"][1]["revealed"], false);
        assert_eq!(value["attempts"], 0);
        assert_eq!(value["input_locked"], false);
        assert_eq!(value["complete"], false);
    }
}
