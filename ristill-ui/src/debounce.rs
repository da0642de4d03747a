//! Trailing-edge debounce timer driven by an external clock.
//!
//! Each poke pushes the deadline back; the timer fires once the clock passes
//! the deadline with no further pokes. Nothing runs by itself: the owner
//! polls with [`Debouncer::fire_if_due`] on every tick.

use chrono::{DateTime, TimeDelta, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Debouncer {
    delay: TimeDelta,
    deadline: Option<DateTime<Utc>>,
}

impl Debouncer {
    pub fn new(delay: TimeDelta) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Restart the quiet period from `now`.
    pub fn poke(&mut self, now: DateTime<Utc>) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` once per quiet period, when `now` reaches the deadline.
    pub fn fire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
