//! Per-turn countdown.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Seconds each turn starts with.
pub const TURN_DURATION_SECS: u32 = 30;

/// Result of advancing the clock by one second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockTick {
    /// Time remains.
    Running(u32),
    /// The countdown reached zero on this tick.
    Expired,
}

/// Whole-second countdown bound to the active turn.
///
/// The clock itself knows nothing about pausing; the session decides when
/// to call [`TurnClock::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnClock {
    duration: u32,
    remaining: u32,
}

impl TurnClock {
    /// Creates a full clock. A zero duration is raised to one second.
    pub fn new(duration: u32) -> Self {
        let duration = duration.max(1);
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Seconds left in the current turn.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// True when at most a third of the turn is left.
    pub fn is_urgent(&self) -> bool {
        self.remaining * 3 <= self.duration
    }

    /// True once the countdown has hit zero.
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Refills the clock for a new turn.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Advances one second. Ticking an expired clock reports `Expired` again.
    pub fn tick(&mut self) -> ClockTick {
        self.remaining = self.remaining.saturating_sub(1);
        if self.is_expired() {
            ClockTick::Expired
        } else {
            ClockTick::Running(self.remaining)
        }
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        Self::new(TURN_DURATION_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_expiry() {
        let mut clock = TurnClock::new(3);
        assert_eq!(clock.tick(), ClockTick::Running(2));
        assert_eq!(clock.tick(), ClockTick::Running(1));
        assert_eq!(clock.tick(), ClockTick::Expired);
        assert!(clock.is_expired());
    }

    #[test]
    fn test_reset_refills() {
        let mut clock = TurnClock::default();
        clock.tick();
        clock.tick();
        assert_eq!(clock.remaining(), TURN_DURATION_SECS - 2);
        clock.reset();
        assert_eq!(clock.remaining(), TURN_DURATION_SECS);
    }

    #[test]
    fn test_zero_duration_is_clamped() {
        let mut clock = TurnClock::new(0);
        assert_eq!(clock.remaining(), 1);
        assert_eq!(clock.tick(), ClockTick::Expired);
    }

    #[test]
    fn test_urgent_in_last_third() {
        let mut clock = TurnClock::new(30);
        for _ in 0..19 {
            clock.tick();
        }
        assert!(!clock.is_urgent());
        clock.tick();
        assert_eq!(clock.remaining(), 10);
        assert!(clock.is_urgent());
    }

    #[test]
    fn test_expired_clock_stays_expired() {
        let mut clock = TurnClock::new(1);
        assert_eq!(clock.tick(), ClockTick::Expired);
        assert_eq!(clock.tick(), ClockTick::Expired);
        assert!(clock.is_expired());
        clock.reset();
        assert!(!clock.is_expired());
    }
}
