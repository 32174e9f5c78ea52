//! The injected time capability (§9 Design Notes: "Global clock").
//!
//! The engine never reads wall-clock time directly. `LiveClock` wraps the OS
//! clock; `TestClock` advances only on an explicit tick and is what drives a
//! backtest's deterministic virtual time. Both sides of the reconciliation
//! protocol and the order FSM's `ts_event`/`ts_init` stamps go through this
//! trait, never through a process-global time source.
//!
//! This is a deliberately small slice of the teacher's `Clock`: no timers, no
//! alerts, no callback heap. The engine here needs a timestamp source, not a
//! strategy scheduler.

use ironclad_core::UnixNanos;

/// A source of nanosecond timestamps.
pub trait Clock: std::fmt::Debug + Send + Sync {
    /// The current time, in nanoseconds since the UNIX epoch.
    fn timestamp_ns(&self) -> UnixNanos;
}

/// Wraps the OS monotonic/wall clock. Used in live trading.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveClock;

impl LiveClock {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for LiveClock {
    fn timestamp_ns(&self) -> UnixNanos {
        UnixNanos::now()
    }
}

/// A virtual clock that only moves when told to. Used in backtests so that a
/// replayed trace produces identical timestamps on every run.
#[derive(Debug, Clone)]
pub struct TestClock {
    now: std::sync::atomic::AtomicU64,
}

impl TestClock {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Sets the clock to an absolute time.
    pub fn set_time(&self, ts: UnixNanos) {
        self.now
            .store(ts.as_u64(), std::sync::atomic::Ordering::SeqCst);
    }

    /// Advances the clock by `delta_ns`.
    pub fn advance_time(&self, delta_ns: u64) {
        self.now
            .fetch_add(delta_ns, std::sync::atomic::Ordering::SeqCst);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn timestamp_ns(&self) -> UnixNanos {
        UnixNanos::new(self.now.load(std::sync::atomic::Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_test_clock_starts_at_zero() {
        let clock = TestClock::new();
        assert!(clock.timestamp_ns().is_zero());
    }

    #[rstest]
    fn test_test_clock_advance_is_monotonic() {
        let clock = TestClock::new();
        clock.advance_time(100);
        assert_eq!(clock.timestamp_ns().as_u64(), 100);
        clock.advance_time(50);
        assert_eq!(clock.timestamp_ns().as_u64(), 150);
    }

    #[rstest]
    fn test_test_clock_set_time_is_absolute() {
        let clock = TestClock::new();
        clock.advance_time(100);
        clock.set_time(UnixNanos::new(7));
        assert_eq!(clock.timestamp_ns().as_u64(), 7);
    }

    #[rstest]
    fn test_live_clock_is_close_to_now() {
        let clock = LiveClock::new();
        let before = UnixNanos::now().as_u64();
        let observed = clock.timestamp_ns().as_u64();
        assert!(observed >= before);
    }
}
