use alloc::collections::BTreeMap;
use core::time::Duration;
use serde::{Deserialize, Serialize};

use crate::*;

/// Deferred transition scheduled by a turn resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    /// Ends the hold after a match.
    ReleaseMatch,
    /// Turns a mismatched pair face-down again.
    HideMismatch {
        first: SlotIndex,
        second: SlotIndex,
    },
    /// Ends the lock once a mismatched pair is hidden.
    ReleaseMismatch,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    pub due: Duration,
    pub generation: Generation,
    pub event: TimerEvent,
}

/// Pending events on a logical clock. Events due at the same instant fire in scheduling order.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    pending: BTreeMap<(Duration, u64), (Generation, TimerEvent)>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, generation: Generation, event: TimerEvent) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        log::trace!("schedule {:?} at {:?} (generation {})", event, due, generation);
        self.pending.insert((due, seq), (generation, event));
    }

    /// Removes the earliest event due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledEvent> {
        let (&(due, _), _) = self.pending.first_key_value()?;
        if due > now {
            return None;
        }
        self.pending
            .pop_first()
            .map(|((due, _), (generation, event))| ScheduledEvent {
                due,
                generation,
                event,
            })
    }

    /// Drops every event not tagged with `generation`, returning how many were dropped.
    pub fn retain_generation(&mut self, generation: Generation) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, (tagged, _)| *tagged == generation);
        before - self.pending.len()
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|&(due, _)| due)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
