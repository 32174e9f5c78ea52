//! [`Instrument`]: static contract terms for a tradable [`Security`](crate::identifiers::Security).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    identifiers::Security,
    types::{Currency, Price, Quantity},
};
use ironclad_core::{correctness::CorrectnessError, UnixNanos};

/// Static contract terms for a tradable instrument.
///
/// Constructed once by the (out-of-scope) instrument provider and treated as
/// immutable thereafter; the engine only ever reads these fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub security: Security,
    pub base_currency: Currency,
    pub quote_currency: Currency,
    pub settlement_currency: Currency,
    /// Quantity is expressed in quote currency rather than base (e.g. inverse futures).
    pub is_inverse: bool,
    pub price_precision: u8,
    pub size_precision: u8,
    pub cost_precision: u8,
    pub tick_size: Price,
    pub multiplier: Decimal,
    pub lot_size: Quantity,
    pub min_quantity: Option<Quantity>,
    pub max_quantity: Option<Quantity>,
    pub min_price: Option<Price>,
    pub max_price: Option<Price>,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
    pub initial_margin: Decimal,
    pub maintenance_margin: Decimal,
    pub ts_init: UnixNanos,
}

impl Instrument {
    /// Whether settlement occurs in a currency that is neither the base nor the
    /// quote currency (a "quanto" contract).
    #[must_use]
    pub fn is_quanto(&self) -> bool {
        self.settlement_currency != self.base_currency && self.settlement_currency != self.quote_currency
    }

    /// Validates the invariants from the data model: quanto flag consistency,
    /// ordered bounds, and non-negative fee/margin rates.
    ///
    /// # Errors
    ///
    /// Returns [`CorrectnessError`] describing the first invariant violated.
    pub fn check_invariants(&self) -> Result<(), CorrectnessError> {
        if let (Some(min), Some(max)) = (self.min_quantity, self.max_quantity) {
            if min > max {
                return Err(CorrectnessError::InvalidValue {
                    field: "min_quantity/max_quantity",
                    reason: format!("min_quantity {min} > max_quantity {max}"),
                });
            }
        }
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(CorrectnessError::InvalidValue {
                    field: "min_price/max_price",
                    reason: format!("min_price {min} > max_price {max}"),
                });
            }
        }
        ironclad_core::correctness::check_non_negative(self.maker_fee, "maker_fee")?;
        ironclad_core::correctness::check_non_negative(self.taker_fee, "taker_fee")?;
        ironclad_core::correctness::check_non_negative(self.initial_margin, "initial_margin")?;
        ironclad_core::correctness::check_non_negative(
            self.maintenance_margin,
            "maintenance_margin",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    use super::*;
    use crate::enums::{AssetClass, AssetType};

    #[fixture]
    fn instrument() -> Instrument {
        Instrument {
            security: Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot),
            base_currency: Currency::new("BTC", 8),
            quote_currency: Currency::usdt(),
            settlement_currency: Currency::usdt(),
            is_inverse: false,
            price_precision: 2,
            size_precision: 6,
            cost_precision: 6,
            tick_size: Price::new(dec!(0.01), 2),
            multiplier: dec!(1),
            lot_size: Quantity::new(dec!(0.0001), 6),
            min_quantity: Some(Quantity::new(dec!(0.0001), 6)),
            max_quantity: Some(Quantity::new(dec!(1000), 6)),
            min_price: None,
            max_price: None,
            maker_fee: dec!(0.001),
            taker_fee: dec!(0.002),
            initial_margin: dec!(0.1),
            maintenance_margin: dec!(0.05),
            ts_init: UnixNanos::default(),
        }
    }

    #[rstest]
    fn test_not_quanto_when_settlement_is_quote(instrument: Instrument) {
        assert!(!instrument.is_quanto());
        assert!(instrument.check_invariants().is_ok());
    }

    #[rstest]
    fn test_is_quanto_when_settlement_differs(mut instrument: Instrument) {
        instrument.settlement_currency = Currency::usd();
        assert!(instrument.is_quanto());
    }

    #[rstest]
    fn test_invariant_violation_on_inverted_quantity_bounds(mut instrument: Instrument) {
        instrument.min_quantity = Some(Quantity::new(dec!(10), 6));
        instrument.max_quantity = Some(Quantity::new(dec!(1), 6));
        assert!(instrument.check_invariants().is_err());
    }
}
