use core::time::Duration;
use web_time::Instant;

use crate::*;

/// Feeds wall-clock time into a [`Session`].
///
/// A frontend calls [`RealtimeDriver::tick`] from its platform timer (or animation frame) and
/// re-arms that timer for [`RealtimeDriver::deadline`].
#[derive(Debug)]
pub struct RealtimeDriver<G = RandomDeckGenerator> {
    session: Session<G>,
    last_tick: Instant,
}

impl<G: DeckGenerator> RealtimeDriver<G> {
    pub fn new(session: Session<G>, now: Instant) -> Self {
        Self {
            session,
            last_tick: now,
        }
    }

    /// Fires every timer due by `now`. Instants earlier than the last tick are treated as no time passing.
    pub fn tick(&mut self, now: Instant) -> usize {
        let elapsed = now.saturating_duration_since(self.last_tick);
        if elapsed.is_zero() {
            return 0;
        }
        self.last_tick = now;
        self.session.advance(elapsed)
    }

    /// Catches up on time first so a click right after a delay sees the resolved board.
    pub fn select_token(&mut self, index: usize, now: Instant) -> Result<SelectOutcome> {
        self.tick(now);
        self.session.select_token(index)
    }

    pub fn new_game(&mut self, now: Instant) -> Result<()> {
        self.tick(now);
        self.session.new_game()
    }

    /// When the next pending timer is due, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.session
            .time_until_next_event()
            .map(|delay| self.last_tick + delay)
    }

    pub fn time_until_deadline(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    pub fn session(&self) -> &Session<G> {
        &self.session
    }

    pub fn into_session(self) -> Session<G> {
        self.session
    }
}
