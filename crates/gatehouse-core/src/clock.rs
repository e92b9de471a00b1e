//! Injected time source.
//!
//! Expiry and usage logic is only correct relative to *some* notion of
//! "now", and that notion must be controllable in tests. All engine
//! components take a [`Clock`] at construction and never read the wall
//! clock ambiently.

use std::sync::RwLock;

use crate::types::Timestamp;

/// A source of "now".
pub trait Clock: Send + Sync {
    /// The current time according to this clock.
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A manually driven clock for tests.
///
/// Starts at a fixed instant and only moves when told to. Lives in the
/// library (not behind `cfg(test)`) so downstream crates can drive
/// expiry deterministically in their own tests.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<Timestamp>,
}

impl ManualClock {
    /// Create a clock pinned at `start`.
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Create a clock pinned at the current wall-clock time.
    #[must_use]
    pub fn at_wall_clock() -> Self {
        Self::new(Timestamp::now())
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: chrono::Duration) {
        if let Ok(mut now) = self.now.write() {
            *now = now.plus(duration);
        }
    }

    /// Pin the clock to an exact instant.
    pub fn set(&self, instant: Timestamp) {
        if let Ok(mut now) = self.now.write() {
            *now = instant;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.read().map(|now| *now).unwrap_or_else(|e| *e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_is_pinned() {
        let clock = ManualClock::at_wall_clock();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);
    }

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::at_wall_clock();
        let start = clock.now();
        clock.advance(Duration::minutes(30));
        assert_eq!(clock.now().since(start), Duration::minutes(30));
    }

    #[test]
    fn test_manual_clock_set() {
        let clock = ManualClock::at_wall_clock();
        let target = Timestamp::now().plus(Duration::days(2));
        clock.set(target);
        assert_eq!(clock.now(), target);
    }
}
