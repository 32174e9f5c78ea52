use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An exact-decimal price at a fixed precision. Arithmetic on `Price` never uses
/// floating point; conversion to `f64` is only ever a serialization or logging hint.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    raw: Decimal,
    precision: u8,
}

impl Price {
    /// Creates a new [`Price`], rounding `value` to `precision` decimal places.
    #[must_use]
    pub fn new(value: Decimal, precision: u8) -> Self {
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

impl std::ops::Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.raw + rhs.raw, self.precision.max(rhs.precision))
    }
}

impl std::ops::Sub for Price {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.raw - rhs.raw, self.precision.max(rhs.precision))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.*}", usize::from(self.precision), self.raw)
    }
}

impl std::fmt::Debug for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Price({self})")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_rounds_to_precision() {
        let price = Price::new(dec!(100.12345), 2);
        assert_eq!(price.to_string(), "100.12");
    }

    #[rstest]
    fn test_display_pads_trailing_zeros() {
        let price = Price::new(dec!(100), 4);
        assert_eq!(price.to_string(), "100.0000");
    }
}
