//! Order lifecycle events. Each variant is the trigger for exactly one edge in the
//! order state machine (see [`crate::orders::fsm`]); the event carries whatever
//! data that transition needs to record (a venue order id, a fill quantity, a
//! rejection reason).

use ironclad_core::{UnixNanos, UUID4};
use serde::{Deserialize, Serialize};

use crate::{
    enums::{LiquiditySide, OrderSide},
    identifiers::{AccountId, ClientOrderId, ExecutionId, OrderId, StrategyId, TraderId},
    types::{Money, Price, Quantity},
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderSubmitted {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub client_order_id: ClientOrderId,
    pub account_id: AccountId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRejected {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub client_order_id: ClientOrderId,
    pub account_id: AccountId,
    pub reason: String,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderAccepted {
    pub trader_id: TraderId,
    pub strategy_id: StrategyId,
    pub client_order_id: ClientOrderId,
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderWorking {
    pub client_order_id: ClientOrderId,
    pub order_id: OrderId,
    pub price: Option<Price>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderTriggered {
    pub client_order_id: ClientOrderId,
    pub order_id: OrderId,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderModified {
    pub client_order_id: ClientOrderId,
    pub order_id: OrderId,
    pub quantity: Option<Quantity>,
    pub price: Option<Price>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub client_order_id: ClientOrderId,
    pub order_id: Option<OrderId>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderExpired {
    pub client_order_id: ClientOrderId,
    pub order_id: Option<OrderId>,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderPartiallyFilled {
    pub client_order_id: ClientOrderId,
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub trade_id: ExecutionId,
    pub order_side: OrderSide,
    pub fill_qty: Quantity,
    pub fill_price: Price,
    pub commission: Money,
    pub liquidity_side: LiquiditySide,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderFilled {
    pub client_order_id: ClientOrderId,
    pub order_id: OrderId,
    pub account_id: AccountId,
    pub trade_id: ExecutionId,
    pub order_side: OrderSide,
    pub fill_qty: Quantity,
    pub fill_price: Price,
    pub commission: Money,
    pub liquidity_side: LiquiditySide,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

/// Synthesized by the engine itself when a `SubmitOrder` command fails validation
/// before ever reaching a client (unknown venue, duplicate client order id).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderDenied {
    pub client_order_id: ClientOrderId,
    pub reason: String,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

/// Synthesized when an integrity fault is detected (e.g. an over-fill); marks the
/// order `INVALID` regardless of its FSM state at the time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderInvalid {
    pub client_order_id: ClientOrderId,
    pub reason: String,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

/// A venue order-modify request that the venue refused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderModifyRejected {
    pub client_order_id: ClientOrderId,
    pub order_id: Option<OrderId>,
    pub reason: String,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

/// A venue cancel request that the venue refused.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderCancelRejected {
    pub client_order_id: ClientOrderId,
    pub order_id: Option<OrderId>,
    pub reason: String,
    pub event_id: UUID4,
    pub ts_event: UnixNanos,
    pub ts_init: UnixNanos,
}

/// Tagged union of every order lifecycle event. This is what travels through the
/// engine's command/event queue and what [`crate::orders::Order::apply`] consumes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEventAny {
    Submitted(OrderSubmitted),
    Rejected(OrderRejected),
    Accepted(OrderAccepted),
    Working(OrderWorking),
    Triggered(OrderTriggered),
    Modified(OrderModified),
    ModifyRejected(OrderModifyRejected),
    Cancelled(OrderCancelled),
    CancelRejected(OrderCancelRejected),
    Expired(OrderExpired),
    PartiallyFilled(OrderPartiallyFilled),
    Filled(OrderFilled),
    Denied(OrderDenied),
    Invalid(OrderInvalid),
}

impl OrderEventAny {
    #[must_use]
    pub const fn client_order_id(&self) -> ClientOrderId {
        match self {
            Self::Submitted(e) => e.client_order_id,
            Self::Rejected(e) => e.client_order_id,
            Self::Accepted(e) => e.client_order_id,
            Self::Working(e) => e.client_order_id,
            Self::Triggered(e) => e.client_order_id,
            Self::Modified(e) => e.client_order_id,
            Self::ModifyRejected(e) => e.client_order_id,
            Self::Cancelled(e) => e.client_order_id,
            Self::CancelRejected(e) => e.client_order_id,
            Self::Expired(e) => e.client_order_id,
            Self::PartiallyFilled(e) => e.client_order_id,
            Self::Filled(e) => e.client_order_id,
            Self::Denied(e) => e.client_order_id,
            Self::Invalid(e) => e.client_order_id,
        }
    }

    #[must_use]
    pub const fn ts_event(&self) -> UnixNanos {
        match self {
            Self::Submitted(e) => e.ts_event,
            Self::Rejected(e) => e.ts_event,
            Self::Accepted(e) => e.ts_event,
            Self::Working(e) => e.ts_event,
            Self::Triggered(e) => e.ts_event,
            Self::Modified(e) => e.ts_event,
            Self::ModifyRejected(e) => e.ts_event,
            Self::Cancelled(e) => e.ts_event,
            Self::CancelRejected(e) => e.ts_event,
            Self::Expired(e) => e.ts_event,
            Self::PartiallyFilled(e) => e.ts_event,
            Self::Filled(e) => e.ts_event,
            Self::Denied(e) => e.ts_event,
            Self::Invalid(e) => e.ts_event,
        }
    }

    /// A short tag for logging (`"OrderFilled"`, `"OrderRejected"`, ...).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submitted(_) => "OrderSubmitted",
            Self::Rejected(_) => "OrderRejected",
            Self::Accepted(_) => "OrderAccepted",
            Self::Working(_) => "OrderWorking",
            Self::Triggered(_) => "OrderTriggered",
            Self::Modified(_) => "OrderModified",
            Self::ModifyRejected(_) => "OrderModifyRejected",
            Self::Cancelled(_) => "OrderCancelled",
            Self::CancelRejected(_) => "OrderCancelRejected",
            Self::Expired(_) => "OrderExpired",
            Self::PartiallyFilled(_) => "OrderPartiallyFilled",
            Self::Filled(_) => "OrderFilled",
            Self::Denied(_) => "OrderDenied",
            Self::Invalid(_) => "OrderInvalid",
        }
    }
}

impl std::fmt::Display for OrderEventAny {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}(client_order_id={})", self.name(), self.client_order_id())
    }
}
