// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

//! Debounce state machine: `Idle` or `Pending(window, deadline)`.
//!
//! Every pushed window replaces the pending one and re-arms the deadline.
//! The driver sleeps until [`Debouncer::deadline`] and then calls
//! [`Debouncer::fire`], which hands back the settled window and returns to
//! `Idle`.

use std::time::Duration;
use tokio::time::Instant;

use crate::data::TimeWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending {
        window: TimeWindow,
        deadline: Instant,
    },
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    state: DebounceState,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: DebounceState::Idle,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            DebounceState::Pending { deadline, .. } => Some(deadline),
            DebounceState::Idle => None,
        }
    }

    /// Record a new candidate window, superseding any pending one.
    pub fn push(&mut self, window: TimeWindow, now: Instant) {
        self.state = DebounceState::Pending {
            window,
            deadline: now + self.delay,
        };
    }

    /// The settled window once its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<TimeWindow> {
        match self.state {
            DebounceState::Pending { window, deadline } if now >= deadline => {
                self.state = DebounceState::Idle;
                Some(window)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    fn window(n: i64) -> TimeWindow {
        TimeWindow::new(0, n).unwrap()
    }

    #[test]
    fn test_idle_never_fires() {
        let mut debouncer = Debouncer::new(DELAY);
        assert_eq!(debouncer.fire(Instant::now() + DELAY), None);
        assert_eq!(debouncer.state(), DebounceState::Idle);
    }

    #[test]
    fn test_fires_after_delay() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        debouncer.push(window(1), t0);

        assert_eq!(debouncer.fire(t0 + DELAY - Duration::from_millis(1)), None);
        assert_eq!(debouncer.fire(t0 + DELAY), Some(window(1)));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_burst_rearms_and_keeps_latest() {
        let mut debouncer = Debouncer::new(DELAY);
        let t0 = Instant::now();
        let step = Duration::from_millis(50);

        debouncer.push(window(1), t0);
        debouncer.push(window(2), t0 + step);
        debouncer.push(window(3), t0 + step * 2);

        // 200ms after the first event is still inside the re-armed delay
        assert_eq!(debouncer.fire(t0 + DELAY), None);
        assert_eq!(debouncer.deadline(), Some(t0 + step * 2 + DELAY));
        assert_eq!(debouncer.fire(t0 + step * 2 + DELAY), Some(window(3)));
        assert_eq!(debouncer.fire(t0 + DELAY * 10), None);
    }
}
