//! Nanosecond-resolution UNIX timestamps.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// UNIX timestamp expressed as nanoseconds since the epoch.
///
/// A value of zero is used throughout the engine to mean "unset" (for example
/// an order's expire time when the order carries no expiry).
#[repr(C)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixNanos(u64);

impl UnixNanos {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// The current wall-clock time, used by the live clock implementation.
    #[must_use]
    pub fn now() -> Self {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        Self(nanos.max(0) as u64)
    }
}

impl From<u64> for UnixNanos {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UnixNanos> for u64 {
    fn from(value: UnixNanos) -> Self {
        value.0
    }
}

impl std::ops::Sub for UnixNanos {
    type Output = i128;

    fn sub(self, rhs: Self) -> Self::Output {
        i128::from(self.0) - i128::from(rhs.0)
    }
}

impl Display for UnixNanos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Debug for UnixNanos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UnixNanos({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_zero_is_unset() {
        assert!(UnixNanos::default().is_zero());
    }

    #[rstest]
    fn test_difference_can_be_negative() {
        let a = UnixNanos::new(5);
        let b = UnixNanos::new(10);
        assert_eq!(a - b, -5);
    }
}
