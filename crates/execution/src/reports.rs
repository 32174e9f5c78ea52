//! Reconciliation reports (§3 Data model: `ExecutionStateReport`).

use std::collections::HashMap;

use ironclad_core::UnixNanos;
use ironclad_model::{
    enums::OrderStatus,
    identifiers::{OrderId, Venue},
    types::{Price, Quantity},
};

/// One order's state as reported by a venue, keyed by the venue-assigned
/// [`OrderId`] — a venue has no concept of `ClientOrderId`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderStatusReport {
    pub order_id: OrderId,
    pub order_status: OrderStatus,
    pub filled_qty: Quantity,
    pub avg_px: Option<Price>,
}

/// A client's ground-truth snapshot of every order it was asked about during a
/// `state_report` call (§4.3, §4.5). Two parallel maps, exactly as specified:
/// `OrderId -> OrderState` and `OrderId -> filled_qty`.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutionStateReport {
    pub venue: Venue,
    pub ts_generated: UnixNanos,
    states: HashMap<OrderId, OrderStatus>,
    filled_qtys: HashMap<OrderId, Quantity>,
    avg_prices: HashMap<OrderId, Price>,
}

impl ExecutionStateReport {
    #[must_use]
    pub fn new(venue: Venue, ts_generated: UnixNanos) -> Self {
        Self {
            venue,
            ts_generated,
            states: HashMap::new(),
            filled_qtys: HashMap::new(),
            avg_prices: HashMap::new(),
        }
    }

    pub fn insert(&mut self, report: OrderStatusReport) {
        self.states.insert(report.order_id, report.order_status);
        self.filled_qtys.insert(report.order_id, report.filled_qty);
        if let Some(avg_px) = report.avg_px {
            self.avg_prices.insert(report.order_id, avg_px);
        }
    }

    #[must_use]
    pub fn state(&self, order_id: OrderId) -> Option<OrderStatus> {
        self.states.get(&order_id).copied()
    }

    #[must_use]
    pub fn filled_qty(&self, order_id: OrderId) -> Option<Quantity> {
        self.filled_qtys.get(&order_id).copied()
    }

    #[must_use]
    pub fn avg_px(&self, order_id: OrderId) -> Option<Price> {
        self.avg_prices.get(&order_id).copied()
    }

    /// Whether the venue reported anything at all for `order_id`. `false` means
    /// the venue has never heard of this order.
    #[must_use]
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.states.contains_key(&order_id)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;

    #[rstest]
    fn test_unreported_order_is_absent() {
        let report = ExecutionStateReport::new(Venue::default(), UnixNanos::default());
        assert!(!report.contains(OrderId::new("X-1")));
        assert_eq!(report.state(OrderId::new("X-1")), None);
    }

    #[rstest]
    fn test_insert_then_read_back() {
        let mut report = ExecutionStateReport::new(Venue::default(), UnixNanos::default());
        let order_id = OrderId::new("X-1");
        report.insert(OrderStatusReport {
            order_id,
            order_status: OrderStatus::Filled,
            filled_qty: Quantity::new(dec!(10), 0),
            avg_px: Some(Price::new(dec!(100), 0)),
        });
        assert_eq!(report.state(order_id), Some(OrderStatus::Filled));
        assert_eq!(report.filled_qty(order_id).unwrap().raw(), dec!(10));
    }
}
