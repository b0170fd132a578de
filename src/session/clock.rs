//! Monotonic timing for sessions and rounds
//!
//! Time is read through the `Clock` trait so the session driver never calls
//! `Instant::now()` directly. Random mode counts down from a fixed budget,
//! sequential mode counts up.

use std::time::{Duration, Instant};

/// Source of monotonic instants
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Session timer started when play begins
#[derive(Clone, Copy, Debug)]
pub struct SessionClock {
    started: Instant,
    /// Countdown budget; `None` counts up without limit
    budget: Option<Duration>,
}

impl SessionClock {
    pub fn countdown(started: Instant, budget: Duration) -> Self {
        SessionClock {
            started,
            budget: Some(budget),
        }
    }

    pub fn count_up(started: Instant) -> Self {
        SessionClock {
            started,
            budget: None,
        }
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.started)
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.budget
            .map(|budget| budget.saturating_sub(self.elapsed(now)))
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.remaining(now).is_some_and(|r| r.is_zero())
    }

    /// Whole seconds to print: remaining for a countdown, elapsed otherwise
    pub fn display_secs(&self, now: Instant) -> u64 {
        let elapsed = self.elapsed(now).as_secs();
        match self.budget {
            Some(budget) => budget.as_secs().saturating_sub(elapsed),
            None => elapsed,
        }
    }
}

/// Measures answer latency from the moment a position is shown
#[derive(Clone, Copy, Debug)]
pub struct RoundTimer {
    presented_at: Instant,
}

impl RoundTimer {
    pub fn start(presented_at: Instant) -> Self {
        RoundTimer { presented_at }
    }

    pub fn latency(&self, answered_at: Instant) -> Duration {
        answered_at.saturating_duration_since(self.presented_at)
    }
}

/// Format whole seconds as `m:ss`
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Hand-advanced clock shared between a test and the code under test
#[cfg(test)]
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<Instant>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            now: std::rc::Rc::new(std::cell::Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) -> Instant {
        let next = self.now.get() + by;
        self.now.set(next);
        next
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
