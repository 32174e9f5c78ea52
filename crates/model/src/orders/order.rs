//! The [`Order`] entity: an order's identity, its resting terms, and its
//! execution facts (fills, average price, leaves quantity).

use ironclad_core::{fsm::FiniteStateMachine, UnixNanos};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fsm::{build_transition_table, parse_status, parse_trigger, OrderTrigger};
use crate::{
    enums::{OrderSide, OrderStatus, OrderType, TimeInForce},
    events::order::OrderEventAny,
    identifiers::{ClientOrderId, ExecutionId, OrderId, Security, StrategyId, TraderId},
    types::{Money, Price, Quantity},
};

/// One recorded fill against this order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub trade_id: ExecutionId,
    pub qty: Quantity,
    pub price: Price,
    pub commission: Money,
    pub ts_event: UnixNanos,
}

/// Errors raised while applying an event to an [`Order`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    /// The event has no mapped transition from the order's current state. The
    /// order's state and fields are left unchanged.
    #[error(transparent)]
    InvalidStateTransition(#[from] ironclad_core::fsm::InvalidStateTrigger),
    /// The event is individually well-formed but violates an accounting invariant
    /// (an over-fill). The order is forced to `INVALID`.
    #[error("integrity fault on order {client_order_id}: {reason}")]
    Integrity {
        client_order_id: ClientOrderId,
        reason: String,
    },
}

/// An order: its static submission terms, and the execution facts accumulated as
/// events are applied to it.
#[derive(Debug, Clone)]
pub struct Order {
    pub client_order_id: ClientOrderId,
    pub order_id: Option<OrderId>,
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub security: Security,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub price: Option<Price>,
    pub time_in_force: TimeInForce,
    pub expire_time: Option<UnixNanos>,
    pub filled_qty: Quantity,
    pub leaves_qty: Quantity,
    pub avg_price: Option<Price>,
    pub commission: Option<Money>,
    pub fills: Vec<Fill>,
    pub reject_reason: Option<String>,
    pub cancel_reason: Option<String>,
    pub ts_last: UnixNanos,
    fsm: FiniteStateMachine<OrderStatus, OrderTrigger>,
}

impl Order {
    /// Creates a new order in `INITIALIZED` state.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_order_id: ClientOrderId,
        trader_id: TraderId,
        strategy_id: StrategyId,
        security: Security,
        side: OrderSide,
        order_type: OrderType,
        quantity: Quantity,
        price: Option<Price>,
        time_in_force: TimeInForce,
        expire_time: Option<UnixNanos>,
        ts_init: UnixNanos,
    ) -> Self {
        Self {
            client_order_id,
            order_id: None,
            trader_id,
            strategy_id,
            security,
            side,
            order_type,
            quantity,
            price,
            time_in_force,
            expire_time,
            filled_qty: Quantity::zero(quantity.precision()),
            leaves_qty: quantity,
            avg_price: None,
            commission: None,
            fills: Vec::new(),
            reject_reason: None,
            cancel_reason: None,
            ts_last: ts_init,
            fsm: FiniteStateMachine::new(
                OrderStatus::Initialized,
                build_transition_table(),
                parse_status,
                parse_trigger,
            ),
        }
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.fsm.state()
    }

    /// Reconstructs a previously-persisted order directly into `status`,
    /// bypassing the transition table. For a storage backend restoring a
    /// snapshot it already validated before writing it out — never for a live
    /// transition, which must go through [`Order::apply`].
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        client_order_id: ClientOrderId,
        order_id: Option<OrderId>,
        trader_id: TraderId,
        strategy_id: StrategyId,
        security: Security,
        side: OrderSide,
        order_type: OrderType,
        quantity: Quantity,
        price: Option<Price>,
        time_in_force: TimeInForce,
        expire_time: Option<UnixNanos>,
        status: OrderStatus,
        filled_qty: Quantity,
        leaves_qty: Quantity,
        avg_price: Option<Price>,
        commission: Option<Money>,
        fills: Vec<Fill>,
        reject_reason: Option<String>,
        cancel_reason: Option<String>,
        ts_last: UnixNanos,
    ) -> Self {
        Self {
            client_order_id,
            order_id,
            trader_id,
            strategy_id,
            security,
            side,
            order_type,
            quantity,
            price,
            time_in_force,
            expire_time,
            filled_qty,
            leaves_qty,
            avg_price,
            commission,
            fills,
            reject_reason,
            cancel_reason,
            ts_last,
            fsm: FiniteStateMachine::new(status, build_transition_table(), parse_status, parse_trigger),
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status().is_open()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.status().is_terminal()
    }

    /// Forces the order into `INVALID` directly, bypassing the transition table.
    /// Used only for integrity faults; never exposed as a regular trigger since
    /// no legitimate event is allowed to cause it.
    fn force_invalid(&mut self, reason: String, ts_event: UnixNanos) {
        self.fsm = FiniteStateMachine::new(
            OrderStatus::Invalid,
            build_transition_table(),
            parse_status,
            parse_trigger,
        );
        self.reject_reason = Some(reason);
        self.ts_last = ts_event;
    }

    /// Applies an event to this order, advancing its state machine and updating
    /// its execution facts.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::InvalidStateTransition`] if `event` has no mapped
    /// transition from the current state — the order is left completely
    /// unchanged in that case. Returns [`OrderError::Integrity`] if a fill event
    /// would push cumulative filled quantity past `quantity`; the order is
    /// forced to `INVALID` and no fill is recorded.
    pub fn apply(&mut self, event: &OrderEventAny) -> Result<(), OrderError> {
        match event {
            OrderEventAny::Submitted(e) => {
                self.fsm.trigger(OrderTrigger::Submitted)?;
                self.ts_last = e.ts_event;
            }
            OrderEventAny::Rejected(e) => {
                self.fsm.trigger(OrderTrigger::Rejected)?;
                self.reject_reason = Some(e.reason.clone());
                self.ts_last = e.ts_event;
            }
            OrderEventAny::Accepted(e) => {
                self.fsm.trigger(OrderTrigger::Accepted)?;
                self.order_id = Some(e.order_id);
                self.ts_last = e.ts_event;
            }
            OrderEventAny::Working(e) => {
                self.fsm.trigger(OrderTrigger::Working)?;
                if let Some(price) = e.price {
                    self.price = Some(price);
                }
                self.ts_last = e.ts_event;
            }
            OrderEventAny::Triggered(e) => {
                self.fsm.trigger(OrderTrigger::Triggered)?;
                self.ts_last = e.ts_event;
            }
            OrderEventAny::Modified(e) => {
                self.fsm.trigger(OrderTrigger::Modified)?;
                if let Some(qty) = e.quantity {
                    self.quantity = qty;
                    self.leaves_qty = qty - self.filled_qty;
                }
                if let Some(price) = e.price {
                    self.price = Some(price);
                }
                self.ts_last = e.ts_event;
            }
            OrderEventAny::ModifyRejected(_) => {
                // Does not change order state; the order keeps its prior terms.
            }
            OrderEventAny::Cancelled(e) => {
                self.fsm.trigger(OrderTrigger::Cancelled)?;
                self.ts_last = e.ts_event;
            }
            OrderEventAny::CancelRejected(_) => {}
            OrderEventAny::Expired(e) => {
                self.fsm.trigger(OrderTrigger::Expired)?;
                self.ts_last = e.ts_event;
            }
            OrderEventAny::PartiallyFilled(e) => {
                self.apply_fill(
                    e.trade_id,
                    e.fill_qty,
                    e.fill_price,
                    e.commission,
                    e.ts_event,
                    OrderTrigger::PartiallyFilled,
                )?;
            }
            OrderEventAny::Filled(e) => {
                self.apply_fill(
                    e.trade_id,
                    e.fill_qty,
                    e.fill_price,
                    e.commission,
                    e.ts_event,
                    OrderTrigger::Filled,
                )?;
            }
            OrderEventAny::Denied(e) => {
                self.reject_reason = Some(e.reason.clone());
                self.ts_last = e.ts_event;
            }
            OrderEventAny::Invalid(e) => {
                self.force_invalid(e.reason.clone(), e.ts_event);
            }
        }
        Ok(())
    }

    /// Shared accounting for `OrderPartiallyFilled` and `OrderFilled`: checks the
    /// over-fill invariant *before* mutating the FSM state, then updates the
    /// quantity-weighted average price.
    fn apply_fill(
        &mut self,
        trade_id: ExecutionId,
        fill_qty: Quantity,
        fill_price: Price,
        commission: Money,
        ts_event: UnixNanos,
        trigger: OrderTrigger,
    ) -> Result<(), OrderError> {
        let new_cum = self.filled_qty + fill_qty;
        if new_cum.raw() > self.quantity.raw() {
            let reason = format!(
                "cumulative filled quantity {new_cum} would exceed order quantity {}",
                self.quantity
            );
            self.force_invalid(reason.clone(), ts_event);
            return Err(OrderError::Integrity {
                client_order_id: self.client_order_id,
                reason,
            });
        }

        self.fsm.trigger(trigger)?;

        let old_cum = self.filled_qty.raw();
        let old_avg = self.avg_price.map_or(Decimal::ZERO, |p| p.raw());
        let new_avg_raw = if new_cum.raw().is_zero() {
            Decimal::ZERO
        } else {
            (old_avg * old_cum + fill_price.raw() * fill_qty.raw()) / new_cum.raw()
        };

        self.filled_qty = new_cum;
        self.leaves_qty = self.quantity - self.filled_qty;
        self.avg_price = Some(Price::new(new_avg_raw, fill_price.precision()));
        self.commission = Some(match self.commission {
            Some(existing) => existing + commission,
            None => commission,
        });
        self.fills.push(Fill {
            trade_id,
            qty: fill_qty,
            price: fill_price,
            commission,
            ts_event,
        });
        self.ts_last = ts_event;
        Ok(())
    }
}
