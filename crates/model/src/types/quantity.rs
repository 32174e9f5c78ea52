use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exact-decimal, non-negative quantity at a fixed precision.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity {
    raw: Decimal,
    precision: u8,
}

impl Quantity {
    /// Creates a new [`Quantity`], rounding `value` to `precision` decimal places.
    ///
    /// # Panics
    ///
    /// Panics if `value` is negative.
    #[must_use]
    pub fn new(value: Decimal, precision: u8) -> Self {
        assert!(value >= Decimal::ZERO, "quantity cannot be negative: {value}");
        Self {
            raw: value.round_dp(u32::from(precision)),
            precision,
        }
    }

    #[must_use]
    pub const fn zero(precision: u8) -> Self {
        Self {
            raw: Decimal::ZERO,
            precision,
        }
    }

    #[must_use]
    pub const fn raw(&self) -> Decimal {
        self.raw
    }

    #[must_use]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.raw.to_string().parse().unwrap_or(0.0)
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.raw.is_zero()
    }
}

impl std::ops::Add for Quantity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.raw + rhs.raw, self.precision.max(rhs.precision))
    }
}

impl std::ops::Sub for Quantity {
    type Output = Self;

    /// Saturates at zero rather than going negative: a venue-reported fill that
    /// (due to a race) slightly exceeds leaves quantity should not underflow.
    fn sub(self, rhs: Self) -> Self::Output {
        let diff = (self.raw - rhs.raw).max(Decimal::ZERO);
        Self::new(diff, self.precision.max(rhs.precision))
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.*}", usize::from(self.precision), self.raw)
    }
}

impl std::fmt::Debug for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Quantity({self})")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_subtraction_saturates_at_zero() {
        let a = Quantity::new(dec!(4), 0);
        let b = Quantity::new(dec!(10), 0);
        assert_eq!((a - b).raw(), Decimal::ZERO);
    }

    #[rstest]
    #[should_panic(expected = "cannot be negative")]
    fn test_new_panics_on_negative() {
        let _ = Quantity::new(dec!(-1), 0);
    }
}
