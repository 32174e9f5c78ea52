use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::currency::Currency;

/// An exact-decimal monetary amount denominated in a [`Currency`].
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Money {
    raw: Decimal,
    currency: Currency,
}

impl Money {
    #[must_use]
    pub fn new(value: Decimal, currency: Currency) -> Self {
        Self {
            raw: value.round_dp(u32::from(currency.precision())),
            currency,
        }
    }

    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            raw: Decimal::ZERO,
            currency,
        }
    }

    #[must_use]
    pub const fn raw(&self) -> Decimal {
        self.raw
    }

    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    #[must_use]
    pub fn as_f64(&self) -> f64 {
        self.raw.to_string().parse().unwrap_or(0.0)
    }
}

impl std::ops::Add for Money {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if the two amounts are denominated in different currencies.
    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(
            self.currency, rhs.currency,
            "cannot add Money in different currencies"
        );
        Self::new(self.raw + rhs.raw, self.currency)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.*} {}",
            usize::from(self.currency.precision()),
            self.raw,
            self.currency
        )
    }
}

impl std::fmt::Debug for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Money({self})")
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_display_includes_currency_code() {
        let m = Money::new(dec!(12.2), Currency::usdt());
        assert_eq!(m.to_string(), "12.200000 USDT");
    }

    #[rstest]
    #[should_panic(expected = "different currencies")]
    fn test_add_rejects_mismatched_currency() {
        let a = Money::new(dec!(1), Currency::usd());
        let b = Money::new(dec!(1), Currency::usdt());
        let _ = a + b;
    }
}
