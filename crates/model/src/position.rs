//! [`Position`]: a derived per-`(strategy_id, security)` view built up from fills.

use ironclad_core::UnixNanos;
use serde::{Deserialize, Serialize};

use crate::{
    enums::{OrderSide, PositionSide},
    identifiers::{PositionId, Security, StrategyId},
    types::{Currency, Money, Price, Quantity},
};

/// A position keyed by `(strategy_id, security)`. Created on the first fill for a
/// key, updated by subsequent fills, and closed when its quantity returns to
/// zero. A side flip is represented by closing the existing position and
/// opening a new one — see [`Position::apply_same_side_fill`] and
/// [`Position::apply_reducing_fill`], which the portfolio's flip-splitting logic
/// composes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub position_id: PositionId,
    pub strategy_id: StrategyId,
    pub security: Security,
    pub side: PositionSide,
    pub quantity: Quantity,
    pub avg_px: Price,
    pub realized_pnl: Money,
    pub ts_opened: UnixNanos,
    pub ts_last: UnixNanos,
}

impl Position {
    /// Opens a new position from a single fill.
    #[must_use]
    pub fn new(
        position_id: PositionId,
        strategy_id: StrategyId,
        security: Security,
        order_side: OrderSide,
        fill_qty: Quantity,
        fill_px: Price,
        currency: Currency,
        ts: UnixNanos,
    ) -> Self {
        Self {
            position_id,
            strategy_id,
            security,
            side: side_for_fill(order_side),
            quantity: fill_qty,
            avg_px: fill_px,
            realized_pnl: Money::zero(currency),
            ts_opened: ts,
            ts_last: ts,
        }
    }

    #[must_use]
    pub fn is_flat(&self) -> bool {
        matches!(self.side, PositionSide::Flat) || self.quantity.is_zero()
    }

    /// Whether a fill on `order_side` would reduce (rather than grow) this position.
    #[must_use]
    pub const fn is_opposite_side(&self, order_side: OrderSide) -> bool {
        matches!(
            (self.side, order_side),
            (PositionSide::Long, OrderSide::Sell) | (PositionSide::Short, OrderSide::Buy)
        )
    }

    /// Whether a reducing fill of `fill_qty` would flip the position to the
    /// opposite side (i.e. the fill quantity exceeds what's open).
    #[must_use]
    pub fn would_flip(&self, order_side: OrderSide, fill_qty: Quantity) -> bool {
        self.is_opposite_side(order_side) && fill_qty.raw() > self.quantity.raw()
    }

    /// Mark-to-market unrealized PnL against `last_price`.
    #[must_use]
    pub fn unrealized_pnl(&self, last_price: Price, currency: Currency) -> Money {
        if self.is_flat() {
            return Money::zero(currency);
        }
        let direction = match self.side {
            PositionSide::Long => rust_decimal::Decimal::ONE,
            PositionSide::Short => -rust_decimal::Decimal::ONE,
            PositionSide::Flat => rust_decimal::Decimal::ZERO,
        };
        let pnl = (last_price.raw() - self.avg_px.raw()) * self.quantity.raw() * direction;
        Money::new(pnl, currency)
    }

    /// Applies a fill on the *same* side as the position: grows quantity and
    /// recomputes the quantity-weighted average entry price. No PnL is realized.
    pub fn apply_same_side_fill(&mut self, fill_qty: Quantity, fill_px: Price, ts: UnixNanos) {
        let new_qty = self.quantity + fill_qty;
        let new_avg = (self.avg_px.raw() * self.quantity.raw() + fill_px.raw() * fill_qty.raw())
            / new_qty.raw();
        self.quantity = new_qty;
        self.avg_px = Price::new(new_avg, fill_px.precision());
        self.ts_last = ts;
    }

    /// Applies a fill on the *opposite* side that does not exceed the current
    /// quantity: reduces quantity and realizes PnL on the closed portion.
    ///
    /// # Panics
    ///
    /// Panics if `fill_qty` exceeds the current quantity; callers must split a
    /// flipping fill via [`Self::would_flip`] before calling this.
    pub fn apply_reducing_fill(
        &mut self,
        fill_qty: Quantity,
        fill_px: Price,
        currency: Currency,
        ts: UnixNanos,
    ) {
        assert!(
            fill_qty.raw() <= self.quantity.raw(),
            "reducing fill exceeds open quantity; caller must split flips first"
        );
        let direction = match self.side {
            PositionSide::Long => rust_decimal::Decimal::ONE,
            PositionSide::Short => -rust_decimal::Decimal::ONE,
            PositionSide::Flat => rust_decimal::Decimal::ZERO,
        };
        let realized = (fill_px.raw() - self.avg_px.raw()) * fill_qty.raw() * direction;
        self.realized_pnl = self.realized_pnl + Money::new(realized, currency);
        self.quantity = self.quantity - fill_qty;
        if self.quantity.is_zero() {
            self.side = PositionSide::Flat;
        }
        self.ts_last = ts;
    }
}

const fn side_for_fill(order_side: OrderSide) -> PositionSide {
    match order_side {
        OrderSide::Buy => PositionSide::Long,
        OrderSide::Sell => PositionSide::Short,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::enums::{AssetClass, AssetType};

    fn security() -> Security {
        Security::new("BTCUSDT", "COINBASE", AssetClass::Crypto, AssetType::Spot)
    }

    #[rstest]
    fn test_new_position_opens_long_from_buy() {
        let pos = Position::new(
            PositionId::new("P-1"),
            StrategyId::default(),
            security(),
            OrderSide::Buy,
            Quantity::new(dec!(10), 0),
            Price::new(dec!(100), 0),
            Currency::usdt(),
            UnixNanos::new(1),
        );
        assert_eq!(pos.side, PositionSide::Long);
        assert_eq!(pos.quantity.raw(), dec!(10));
    }

    #[rstest]
    fn test_same_side_fill_updates_weighted_average() {
        let mut pos = Position::new(
            PositionId::new("P-1"),
            StrategyId::default(),
            security(),
            OrderSide::Buy,
            Quantity::new(dec!(10), 0),
            Price::new(dec!(100), 0),
            Currency::usdt(),
            UnixNanos::new(1),
        );
        pos.apply_same_side_fill(Quantity::new(dec!(10), 0), Price::new(dec!(110), 0), UnixNanos::new(2));
        assert_eq!(pos.quantity.raw(), dec!(20));
        assert_eq!(pos.avg_px.raw(), dec!(105));
    }

    #[rstest]
    fn test_reducing_fill_realizes_pnl_and_can_close() {
        let mut pos = Position::new(
            PositionId::new("P-1"),
            StrategyId::default(),
            security(),
            OrderSide::Buy,
            Quantity::new(dec!(10), 0),
            Price::new(dec!(100), 0),
            Currency::usdt(),
            UnixNanos::new(1),
        );
        pos.apply_reducing_fill(
            Quantity::new(dec!(10), 0),
            Price::new(dec!(110), 0),
            Currency::usdt(),
            UnixNanos::new(2),
        );
        assert!(pos.is_flat());
        assert_eq!(pos.realized_pnl.raw(), dec!(100));
    }

    #[rstest]
    fn test_would_flip_detects_oversized_reducing_fill() {
        let pos = Position::new(
            PositionId::new("P-1"),
            StrategyId::default(),
            security(),
            OrderSide::Buy,
            Quantity::new(dec!(10), 0),
            Price::new(dec!(100), 0),
            Currency::usdt(),
            UnixNanos::new(1),
        );
        assert!(pos.would_flip(OrderSide::Sell, Quantity::new(dec!(15), 0)));
        assert!(!pos.would_flip(OrderSide::Sell, Quantity::new(dec!(5), 0)));
        assert!(!pos.would_flip(OrderSide::Buy, Quantity::new(dec!(15), 0)));
    }
}
